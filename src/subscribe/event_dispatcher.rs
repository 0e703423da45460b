//! # Event dispatcher module
//!
//! Splits the batch of a successful subscribe response into message and
//! presence results, normalizes presence channel naming and forwards the
//! results to the listener registry.

use log::{debug, warn};

use crate::{
    presence::state::PresenceStateStore,
    subscribe::{
        channels::{is_presence_name, presence_base},
        listeners::ListenerRegistry,
        result::Envelope,
        types::{MessageResult, PresenceAction, PresenceResult, StatusCategory, SubscribeStatus},
    },
};

/// Everything the dispatcher needs from the enclosing subscriber.
pub(crate) struct DispatchContext<'a> {
    /// Cursor of the response which delivered the batch.
    pub timetoken: u64,

    /// Snapshot of the subscribed universe, used when the service omits the
    /// subscription name on an event.
    pub fallback_channels: &'a [String],

    /// Identity of the local client, for recognising its own state changes.
    pub user_id: &'a str,

    /// The status which enclosed the batch; per-event statuses clone it.
    pub status: &'a SubscribeStatus,

    pub store: &'a PresenceStateStore,
    pub listeners: &'a dyn ListenerRegistry,
}

/// Forward a response batch to the listener registry, in service order.
pub(crate) fn dispatch(events: Vec<Envelope>, ctx: &DispatchContext<'_>) {
    for event in events {
        let Some(subscribed) = event
            .subscribed_channel
            .or_else(|| ctx.fallback_channels.first().cloned())
        else {
            warn!("dropping event which arrived without a subscription target");
            continue;
        };
        let actual = event.actual_channel.unwrap_or_else(|| subscribed.clone());

        // Normalization applies to the outbound copy only; the subscription
        // list keeps the suffixed names.
        let presence_event = is_presence_name(&subscribed) || is_presence_name(&actual);
        let (subscribed, actual) = if presence_event {
            (
                presence_base(&subscribed).to_string(),
                presence_base(&actual).to_string(),
            )
        } else {
            (subscribed, actual)
        };

        if let Some(presence) = event.presence {
            if matches!(presence.presence_event, PresenceAction::StateChange)
                && presence.uuid == ctx.user_id
            {
                debug!("updating own presence state on '{actual}'");
                if let Some(state) = presence.state.clone() {
                    ctx.store.set(&actual, state);
                }
            }

            ctx.listeners.notify_presence(PresenceResult {
                timetoken: ctx.timetoken,
                subscribed_channel: subscribed,
                actual_channel: actual,
                action: presence.presence_event,
                uuid: presence.uuid,
                state: presence.state,
                timestamp: presence.timestamp,
                occupancy: presence.occupancy,
            });
        } else if let Some(payload) = event.payload {
            let status = event.decryption_error.map(|details| SubscribeStatus {
                category: StatusCategory::DecryptionError,
                is_error: true,
                error_details: Some(details),
                auto_retry: false,
                events: Vec::new(),
                retry_cancel: None,
                ..ctx.status.clone()
            });

            ctx.listeners.notify_message(
                MessageResult {
                    timetoken: ctx.timetoken,
                    subscribed_channel: subscribed,
                    actual_channel: actual,
                    payload,
                },
                status,
            );
        } else {
            warn!("dropping event without payload or presence descriptor");
        }
    }
}
