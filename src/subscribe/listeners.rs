//! # Listener registry surface
//!
//! This module contains the [`ListenerRegistry`] trait through which the
//! subscriber core delivers statuses, messages and presence events to user
//! callbacks.

use crate::subscribe::types::{MessageResult, PresenceResult, SubscribeStatus};

/// Surface of the listener registry consumed by the subscriber core.
///
/// The registry owns its own execution context: implementations are expected
/// to post notifications through their batching primitive rather than run
/// user callbacks inline. The subscriber calls this trait only after
/// releasing its own locks, so callbacks which re-enter the subscriber (for
/// example to add channels) never deadlock.
pub trait ListenerRegistry: Send + Sync {
    /// Deliver a connection status change or a request completion status.
    fn notify_status(&self, status: SubscribeStatus);

    /// Deliver a real-time message.
    ///
    /// `status` accompanies the message with a non-fatal error, for example
    /// when the payload could not be decrypted.
    fn notify_message(&self, message: MessageResult, status: Option<SubscribeStatus>);

    /// Deliver a presence event.
    fn notify_presence(&self, presence: PresenceResult);
}
