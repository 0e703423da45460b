//! Subscribe module.
//!
//! Allows subscribe to real-time updates from channels and channel groups.
//!
//! The [`Subscriber`] drives the long-poll subscribe loop against the
//! RelayMesh network: it owns the subscription list, the time token cursor,
//! the connection state machine and the retry timer, and coordinates the
//! transport, the heartbeat announcer and the listener registry around them.

use std::ops::Deref;
use std::sync::{Arc, Weak};

use derive_builder::Builder;
use futures::FutureExt;
use log::{debug, error};
use spin::RwLock;
use uuid::Uuid;

use crate::{
    config::SubscriberConfig,
    core::{RelayError, Runtime, SubscribeCompletion, SubscribeRequest, Transport},
    presence::{
        state::{PresenceState, PresenceStateStore},
        HeartbeatActivity,
    },
    subscribe::{
        channels::SubscriptionList,
        event_dispatcher::DispatchContext,
        result::SubscribeSuccessBody,
        retry::{RetryCycle, RetryTimer},
        state::TargetState,
    },
};

#[doc(inline)]
pub use channels::{
    is_presence_name, presence_base, presence_name, PRESENCE_CHANNEL_SUFFIX,
};
pub mod channels;

#[doc(inline)]
pub use cursor::TimeCursor;
pub mod cursor;

pub(crate) mod event_dispatcher;

#[doc(inline)]
pub use listeners::ListenerRegistry;
pub mod listeners;

pub(crate) mod request;
pub(crate) mod retry;

#[doc(inline)]
pub use state::SubscriberState;
pub mod state;

pub mod result;

#[doc(inline)]
pub use types::{
    MessageResult, PresenceAction, PresenceResult, StatusCategory, SubscribeStatus,
};
pub mod types;

/// Subscriber raw instance.
///
/// This struct contains the actual subscriber state. It shouldn't be used
/// directly; [`Subscriber`] wraps it in `Arc` and uses interior mutability
/// for the subscription list, the cursor and the connection state.
#[derive(Builder)]
#[builder(
    pattern = "owned",
    name = "SubscriberBuilder",
    build_fn(private, name = "build_internal"),
    setter(prefix = "with")
)]
pub struct SubscriberRef<T, R> {
    /// Transport layer which carries long-poll and leave requests.
    transport: Arc<T>,

    /// Runtime environment for detached completion tasks and the retry timer.
    runtime: R,

    /// Registry which delivers statuses and events to user callbacks.
    listeners: Arc<dyn ListenerRegistry>,

    /// Presence heartbeat announcer.
    heartbeat: Arc<dyn HeartbeatActivity>,

    /// Configuration, read on every cycle.
    config: SubscriberConfig,

    /// Per-object presence state announced with each subscribe.
    #[builder(default)]
    state_store: Arc<PresenceStateStore>,

    /// Instance ID used to tag log lines.
    #[builder(setter(into), default = "Uuid::new_v4().to_string()")]
    instance_id: String,

    #[builder(setter(skip), default)]
    channels: RwLock<SubscriptionList>,

    #[builder(setter(skip), default)]
    cursor: RwLock<TimeCursor>,

    #[builder(setter(skip), default)]
    state: RwLock<SubscriberState>,

    #[builder(setter(skip), default)]
    retry: RetryTimer,
}

/// RelayMesh subscriber.
///
/// Thread-safe handle to the subscribe loop. The handle can be cloned and
/// shared between threads; all clones drive the same loop.
pub struct Subscriber<T, R> {
    pub(crate) inner: Arc<SubscriberRef<T, R>>,
}

impl<T, R> Deref for Subscriber<T, R> {
    type Target = SubscriberRef<T, R>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T, R> Clone for Subscriber<T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R> SubscriberBuilder<T, R> {
    /// Build [`Subscriber`] from the builder.
    pub fn build(self) -> Result<Subscriber<T, R>, RelayError> {
        self.build_internal()
            .map(|inner| Subscriber {
                inner: Arc::new(inner),
            })
            .map_err(|err| RelayError::SubscriberInitialization {
                details: err.to_string(),
            })
    }
}

impl<T, R> Subscriber<T, R> {
    /// Add channels to the subscription.
    ///
    /// Names following the presence convention are routed into the presence
    /// channel set. The change takes effect with the next initial subscribe.
    pub fn add_channels(&self, names: &[String]) {
        self.channels.write().add_channels(names);
    }

    /// Remove the given names from the channel and presence channel sets.
    pub fn remove_channels(&self, names: &[String]) {
        self.channels.write().remove_channels(names);
    }

    /// Add channel groups to the subscription.
    pub fn add_channel_groups(&self, names: &[String]) {
        self.channels.write().add_channel_groups(names);
    }

    /// Remove channel groups from the subscription.
    pub fn remove_channel_groups(&self, names: &[String]) {
        self.channels.write().remove_channel_groups(names);
    }

    /// Subscribe for presence events on the given channels.
    pub fn add_presence_channels(&self, names: &[String]) {
        self.channels.write().add_presence_channels(names);
    }

    /// Stop receiving presence events on the given channels.
    pub fn remove_presence_channels(&self, names: &[String]) {
        self.channels.write().remove_presence_channels(names);
    }

    /// Snapshot of regular channel names.
    pub fn channels(&self) -> Vec<String> {
        self.inner.channels.read().channels()
    }

    /// Snapshot of channel group names.
    pub fn channel_groups(&self) -> Vec<String> {
        self.inner.channels.read().channel_groups()
    }

    /// Snapshot of presence channel names.
    pub fn presence_channels(&self) -> Vec<String> {
        self.inner.channels.read().presence_channels()
    }

    /// Snapshot of the entire subscribed universe.
    pub fn all(&self) -> Vec<String> {
        self.inner.channels.read().all()
    }

    /// Current connection lifecycle state.
    pub fn state(&self) -> SubscriberState {
        *self.inner.state.read()
    }

    /// Current subscription cursor.
    pub fn cursor(&self) -> TimeCursor {
        *self.inner.cursor.read()
    }

    /// Per-object presence state announced with each subscribe.
    pub fn presence_state(&self) -> &PresenceStateStore {
        &self.state_store
    }
}

impl<T, R> Subscriber<T, R>
where
    T: Transport + 'static,
    R: Runtime + 'static,
{
    /// Start or continue the subscribe loop.
    ///
    /// An `initial` subscribe is issued after a membership change: the cursor
    /// moves into its catch-up slot and a fresh position is requested from
    /// the service. A non-initial subscribe continues the loop from the
    /// current cursor.
    ///
    /// `state` is merged into the persisted per-object presence state before
    /// the request is produced.
    ///
    /// When the subscription list is empty the loop completes instead:
    /// in-flight long-polls are cancelled and a single
    /// [`StatusCategory::Disconnected`] status is delivered.
    pub fn subscribe(&self, initial: bool, state: Option<PresenceState>) {
        self.retry.stop();

        let (channel_names, channel_groups, empty) = {
            let list = self.inner.channels.read();
            (list.channel_names(), list.channel_groups(), list.is_empty())
        };

        if empty {
            debug!(
                "[{}] subscription list is empty, completing the loop",
                self.instance_id
            );
            {
                let mut state = self.inner.state.write();
                if let Some((next, _)) = state.transition(TargetState::Disconnected) {
                    *state = next;
                }
            }
            self.transport.cancel_subscribe();
            self.listeners
                .notify_status(self.make_status(StatusCategory::Disconnected, 0));
            return;
        }

        if initial {
            self.inner.cursor.write().promote_to_last();
        }

        let timetoken = self.inner.cursor.read().current();
        match request::subscribe_request(
            &channel_names,
            &channel_groups,
            timetoken,
            state.as_ref(),
            self.config.heartbeat_value,
            &self.state_store,
        ) {
            Ok(request) => self.submit_subscribe(request),
            Err(err) => error!(
                "[{}] unable to produce subscribe request: {err}",
                self.instance_id
            ),
        }
    }

    /// Unsubscribe from the given channels or channel groups.
    ///
    /// The objects must already be removed from the subscription list by the
    /// caller, so the re-subscribe issued here runs against the reduced
    /// membership. Presence state for the objects is forgotten.
    ///
    /// Presence-only lists skip the network leave announcement. The cursor is
    /// left untouched either way, so the service resumes delivery at the
    /// unsubscribe moment.
    pub fn unsubscribe(&self, is_channels: bool, objects: Vec<String>) {
        self.state_store.remove(&objects);

        let leaving: Vec<String> = objects
            .iter()
            .filter(|name| !is_presence_name(name))
            .cloned()
            .collect();

        if leaving.is_empty() {
            self.apply_transition(TargetState::Disconnected, 0);
            self.subscribe(true, None);
            self.listeners
                .notify_status(self.make_status(StatusCategory::Acknowledgment, 0));
            return;
        }

        debug!(
            "[{}] leaving {} '{}'",
            self.instance_id,
            if is_channels { "channels" } else { "channel groups" },
            leaving.join(",")
        );

        let request = request::leave_request(is_channels, &leaving);
        let subscriber = Arc::downgrade(&self.inner);
        let transport = self.transport.clone();

        self.runtime.spawn(async move {
            // The loop proceeds regardless of the leave outcome.
            let _completion = transport.leave(request).await;

            if let Some(inner) = subscriber.upgrade() {
                let subscriber = Subscriber { inner };
                subscriber.apply_transition(TargetState::Disconnected, 0);
                subscriber
                    .listeners
                    .notify_status(subscriber.make_status(StatusCategory::Acknowledgment, 0));
                subscriber.subscribe(true, None);
            }
        });
    }

    /// Re-enter the subscribe loop after an unexpected disconnect.
    ///
    /// No-op unless the loop broke down unexpectedly, both cursor slots hold
    /// meaningful positions and the subscription list is non-empty.
    pub fn restore_if_required(&self) {
        let lost = matches!(self.state(), SubscriberState::DisconnectedUnexpectedly);
        let cursor = self.cursor();
        let empty = self.inner.channels.read().is_empty();

        if lost && cursor.current() > 0 && cursor.last() > 0 && !empty {
            debug!("[{}] restoring interrupted subscription", self.instance_id);
            self.subscribe(true, None);
        }
    }

    /// Re-issue a subscribe request with the current cursor.
    pub(crate) fn continue_subscription_cycle(&self) {
        self.subscribe(false, None);
    }

    /// Hand a produced request to the transport and route its completion back
    /// into the loop.
    ///
    /// The spawned task holds a non-owning reference to the subscriber and
    /// becomes a no-op if the subscriber is dropped while the long-poll is
    /// still open.
    fn submit_subscribe(&self, request: SubscribeRequest) {
        debug!(
            "[{}] subscribing on '{}' with tt={}",
            self.instance_id, request.channels, request.timetoken
        );

        let subscriber = Arc::downgrade(&self.inner);
        let transport = self.transport.clone();
        let request_timetoken = request.timetoken;

        self.runtime.spawn(async move {
            let completion = transport.subscribe(request).await;

            if let Some(inner) = subscriber.upgrade() {
                Subscriber { inner }.handle_completion(completion, request_timetoken);
            }
        });
    }

    /// Process a classified subscribe completion.
    ///
    /// `request_timetoken` is the time token the originating request carried;
    /// `0` marks the completion of an initial subscribe.
    pub(crate) fn handle_completion(
        &self,
        completion: SubscribeCompletion,
        request_timetoken: u64,
    ) {
        // The in-flight request returned; any queued retry is moot.
        self.retry.stop();

        debug!(
            "[{}] subscribe completed: {} (tt={request_timetoken})",
            self.instance_id, completion.category
        );

        match completion {
            SubscribeCompletion {
                is_error: false,
                body: Some(body),
                category,
                ..
            } => self.handle_success(body, category, request_timetoken),
            SubscribeCompletion {
                category: StatusCategory::Cancelled,
                ..
            } => self.handle_cancelled(request_timetoken),
            completion
                if matches!(
                    completion.category,
                    StatusCategory::AccessDenied
                        | StatusCategory::Timeout
                        | StatusCategory::MalformedResponse
                        | StatusCategory::TlsConnectionFailed
                ) =>
            {
                self.handle_retriable_failure(completion, request_timetoken)
            }
            completion => self.handle_connection_failure(completion, request_timetoken),
        }
    }

    fn handle_success(
        &self,
        body: SubscribeSuccessBody,
        category: StatusCategory,
        request_timetoken: u64,
    ) {
        let initial = request_timetoken == 0;
        let response_timetoken = body.timetoken;

        {
            let mut cursor = self.inner.cursor.write();
            if initial && self.config.keep_timetoken_on_list_change && cursor.last() > 0 {
                // Catch-up: resume from the pre-change position instead of
                // the fresh service-assigned one.
                cursor.restore_from_last();
            } else {
                cursor.advance(response_timetoken);
            }
        }

        let mut status = self.make_status(category, request_timetoken);
        status.events = body.events;

        // The batch is consumed here; the enclosing status keeps only its
        // cursor so events aren't delivered twice.
        let events = std::mem::take(&mut status.events);
        if !events.is_empty() {
            let fallback = self.inner.channels.read().all();
            event_dispatcher::dispatch(
                events,
                &DispatchContext {
                    timetoken: response_timetoken,
                    fallback_channels: &fallback,
                    user_id: &self.config.user_id,
                    status: &status,
                    store: &self.state_store,
                    listeners: self.listeners.as_ref(),
                },
            );
        }

        // The cursor update above is visible to the request issued here.
        self.continue_subscription_cycle();

        self.heartbeat.start_if_required();

        if initial {
            self.apply_transition(TargetState::Connected, request_timetoken);
        }

        self.listeners.notify_status(status);
    }

    fn handle_cancelled(&self, request_timetoken: u64) {
        // A preempting user action drives the next transition.
        self.heartbeat.stop_if_possible();
        self.listeners
            .notify_status(self.make_status(StatusCategory::Cancelled, request_timetoken));
    }

    fn handle_retriable_failure(&self, completion: SubscribeCompletion, request_timetoken: u64) {
        let mut status = self.make_status(completion.category, request_timetoken);
        status.error_details = completion.error_details;
        status.auto_retry = true;
        status.retry_cancel = Some({
            let retry = self.retry.clone();
            Arc::new(move || retry.stop())
        });

        self.arm_retry();

        if matches!(completion.category, StatusCategory::AccessDenied) {
            self.apply_transition(TargetState::AccessRightsError, request_timetoken);
        } else {
            // Timeouts, TLS failures and malformed responses surface to
            // listeners as an unexpected disconnect.
            status.category = StatusCategory::UnexpectedDisconnect;
            self.apply_transition(TargetState::DisconnectedUnexpectedly, request_timetoken);
        }

        self.listeners.notify_status(status);
    }

    fn handle_connection_failure(&self, completion: SubscribeCompletion, request_timetoken: u64) {
        if self.config.restore_subscription {
            let mut cursor = self.inner.cursor.write();
            if self.config.catch_up_on_restore {
                cursor.promote_to_last();
            } else {
                cursor.reset();
            }
        } else {
            // A non-restorable loss forgets membership and announced state.
            let mut list = self.inner.channels.write();
            self.state_store.remove(&list.all());
            list.clear();
        }

        let mut status = self.make_status(StatusCategory::UnexpectedDisconnect, request_timetoken);
        status.error_details = completion.error_details;
        status.auto_retry = self.config.restore_subscription;

        self.heartbeat.stop_if_possible();
        self.apply_transition(TargetState::DisconnectedUnexpectedly, request_timetoken);
        self.listeners.notify_status(status);
    }

    /// Schedule a delayed re-entry into the subscription cycle.
    fn arm_retry(&self) {
        let subscriber: Weak<SubscriberRef<T, R>> = Arc::downgrade(&self.inner);
        let cycle: RetryCycle = Arc::new(move || {
            let subscriber = subscriber.clone();
            async move {
                if let Some(inner) = subscriber.upgrade() {
                    Subscriber { inner }.continue_subscription_cycle();
                }
            }
            .boxed()
        });

        self.retry.start(&self.runtime, cycle);
    }

    /// Resolve and apply a lifecycle transition.
    ///
    /// Accepted transitions update the stored state and post a status with
    /// the emitted category; disallowed transitions are no-ops without
    /// listener notification.
    fn apply_transition(&self, target: TargetState, request_timetoken: u64) {
        let category = {
            let mut state = self.inner.state.write();
            match state.transition(target) {
                Some((next, category)) => {
                    debug!("[{}] {} -> {next}", self.instance_id, *state);
                    *state = next;
                    Some(category)
                }
                None => None,
            }
        };

        if let Some(category) = category {
            self.listeners
                .notify_status(self.make_status(category, request_timetoken));
        }
    }

    /// Stamp a status with the subscriber snapshot.
    fn make_status(&self, category: StatusCategory, request_timetoken: u64) -> SubscribeStatus {
        let cursor = self.cursor();
        let (channels, channel_groups) = {
            let list = self.inner.channels.read();
            (list.channels(), list.channel_groups())
        };

        SubscribeStatus {
            category,
            is_error: category.is_error(),
            request_timetoken,
            timetoken: cursor.current(),
            last_timetoken: cursor.last(),
            channels,
            channel_groups,
            auto_retry: false,
            error_details: None,
            events: Vec::new(),
            retry_cancel: None,
        }
    }
}
