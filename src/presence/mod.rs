//! Presence module
//!
//! Contains the surface the subscriber core uses to coordinate with the
//! presence subsystem: the heartbeat announcer started and stopped at defined
//! points of the subscribe loop, and the per-channel presence state store.

#[doc(inline)]
pub use state::PresenceStateStore;
pub mod state;

/// Presence heartbeat surface consumed by the subscriber core.
///
/// The subscribe loop starts the heartbeat once updates are flowing and stops
/// it when the loop is preempted or breaks down. Both calls are idempotent on
/// the implementation's side; the subscriber never tracks whether a heartbeat
/// is currently announced.
pub trait HeartbeatActivity: Send + Sync {
    /// Start periodic presence announcements when the configuration asks for
    /// them and none are running yet.
    fn start_if_required(&self);

    /// Stop periodic presence announcements when they are running.
    fn stop_if_possible(&self);
}
