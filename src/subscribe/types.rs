//! Subscription types module.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;

use crate::subscribe::result::Envelope;

/// Classification of a subscribe loop status.
///
/// Categories cover both connection lifecycle transitions and classified
/// request completions reported by the transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusCategory {
    /// Classification is not possible.
    Unknown,

    /// Non-subscribe request (for example leave) completed successfully.
    Acknowledgment,

    /// Successfully connected and receiving real-time updates.
    Connected,

    /// Successfully reconnected after real-time updates receive has been
    /// interrupted.
    Reconnected,

    /// Real-time updates receive stopped on user request.
    Disconnected,

    /// Real-time updates receive stopped unexpectedly.
    UnexpectedDisconnect,

    /// Service denied access to the requested channels or groups.
    AccessDenied,

    /// Request has been preempted by a newer user action.
    Cancelled,

    /// Request didn't complete within the transport timeout.
    Timeout,

    /// Service response can't be decoded.
    MalformedResponse,

    /// Secure connection to the service can't be established.
    TlsConnectionFailed,

    /// Received payload can't be decrypted.
    DecryptionError,
}

impl StatusCategory {
    /// Whether statuses of this category represent an error by themselves.
    ///
    /// Completion-derived statuses carry the transport's own error flag
    /// instead.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedDisconnect
                | Self::AccessDenied
                | Self::Timeout
                | Self::MalformedResponse
                | Self::TlsConnectionFailed
                | Self::DecryptionError
        )
    }
}

impl std::fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Acknowledgment => write!(f, "Acknowledgment"),
            Self::Connected => write!(f, "Connected"),
            Self::Reconnected => write!(f, "Reconnected"),
            Self::Disconnected => write!(f, "Disconnected"),
            Self::UnexpectedDisconnect => write!(f, "UnexpectedDisconnect"),
            Self::AccessDenied => write!(f, "AccessDenied"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Timeout => write!(f, "Timeout"),
            Self::MalformedResponse => write!(f, "MalformedResponse"),
            Self::TlsConnectionFailed => write!(f, "TlsConnectionFailed"),
            Self::DecryptionError => write!(f, "DecryptionError"),
        }
    }
}

/// Subscribe loop status.
///
/// Produced on every connection state transition and every request
/// completion, then handed to the listener registry. Statuses are read-only
/// for receivers.
#[derive(Clone)]
pub struct SubscribeStatus {
    /// Status classification.
    pub category: StatusCategory,

    /// Whether status represents an error.
    pub is_error: bool,

    /// Time token carried by the originating request (`0` for an initial
    /// subscribe).
    pub request_timetoken: u64,

    /// Subscription cursor at the moment the status has been produced.
    pub timetoken: u64,

    /// One-slot cursor history used for catch-up.
    pub last_timetoken: u64,

    /// Channels the client listens on.
    pub channels: Vec<String>,

    /// Channel groups the client listens on.
    pub channel_groups: Vec<String>,

    /// Whether the subscriber re-issues the failed request by itself.
    pub auto_retry: bool,

    /// Human-readable failure description.
    pub error_details: Option<String>,

    /// Decoded event batch of a successful subscribe.
    ///
    /// Emptied once the batch has been split into per-event results, so the
    /// events aren't delivered twice.
    pub events: Vec<Envelope>,

    pub(crate) retry_cancel: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl SubscribeStatus {
    /// Cancel the automatic retry scheduled for a retriable failure.
    ///
    /// No-op for statuses without a scheduled retry and for failures whose
    /// retry is intrinsic (network-level restore).
    pub fn cancel_automatic_retry(&self) {
        if let Some(cancel) = &self.retry_cancel {
            cancel();
        }
    }

    /// Whether the automatic retry can be cancelled by the receiver.
    pub fn is_retry_cancellable(&self) -> bool {
        self.retry_cancel.is_some()
    }
}

impl Debug for SubscribeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscribeStatus")
            .field("category", &self.category)
            .field("is_error", &self.is_error)
            .field("request_timetoken", &self.request_timetoken)
            .field("timetoken", &self.timetoken)
            .field("last_timetoken", &self.last_timetoken)
            .field("channels", &self.channels)
            .field("channel_groups", &self.channel_groups)
            .field("auto_retry", &self.auto_retry)
            .field("error_details", &self.error_details)
            .field("events", &self.events)
            .field("retry_cancellable", &self.retry_cancel.is_some())
            .finish()
    }
}

/// Presence event types delivered on presence channels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresenceAction {
    /// A new user joined the channel.
    Join,

    /// A user left the channel.
    Leave,

    /// Service didn't notice the user for a while.
    Timeout,

    /// A user changed the state associated with them on the channel.
    StateChange,
}

/// Real-time message delivered to the listener registry.
///
/// Carries a single event from a subscribe batch together with the snapshot
/// of the status which enclosed it.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageResult {
    /// Cursor of the response which delivered the event.
    pub timetoken: u64,

    /// Name of the subscription through which the event has been delivered.
    pub subscribed_channel: String,

    /// Channel on which the event has been published.
    pub actual_channel: String,

    /// Decoded message payload.
    pub payload: Value,
}

/// Presence event delivered to the listener registry.
///
/// Channel names are normalized to their non-presence base.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceResult {
    /// Cursor of the response which delivered the event.
    pub timetoken: u64,

    /// Name of the subscription through which the event has been delivered.
    pub subscribed_channel: String,

    /// Channel for which the presence changed.
    pub actual_channel: String,

    /// What happened to the user's presence.
    pub action: PresenceAction,

    /// Identity of the user for which the event has been generated.
    pub uuid: String,

    /// State associated with the user on the channel (`state-change` only).
    pub state: Option<Value>,

    /// Unix timestamp at which the service generated the event.
    pub timestamp: Option<u64>,

    /// Channel occupancy after the change.
    pub occupancy: Option<u64>,
}
