//! # Subscriber configuration module
//!
//! This module contains the [`SubscriberConfig`] struct with the flags which
//! govern catch-up, restore and presence behaviour of the subscribe loop. The
//! configuration is read by the subscriber on every cycle and never mutated by
//! it.

use derive_builder::Builder;

use crate::core::RelayError;

/// Subscriber configuration.
///
/// Built with [`SubscriberConfigBuilder`]:
///
/// ```
/// use relaymesh::SubscriberConfigBuilder;
///
/// # fn main() -> Result<(), relaymesh::core::RelayError> {
/// let config = SubscriberConfigBuilder::default()
///     .with_user_id("my-user-id")
///     .with_heartbeat_value(300)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(
    pattern = "owned",
    build_fn(private, name = "build_internal"),
    setter(prefix = "with")
)]
pub struct SubscriberConfig {
    /// Unique identity of this client on the network.
    ///
    /// Presence events generated for this identity (for example a
    /// `state-change` announced from another device) are recognised as the
    /// client's own.
    #[builder(setter(into))]
    pub user_id: String,

    /// Presence heartbeat period in seconds.
    ///
    /// Attached to every subscribe request as the `heartbeat` query parameter
    /// when greater than zero.
    #[builder(default)]
    pub heartbeat_value: u64,

    /// Whether the subscription should survive a non-retriable network loss.
    ///
    /// When unset, such a loss clears the channel membership and the
    /// per-channel presence state.
    #[builder(default = "true")]
    pub restore_subscription: bool,

    /// Whether a restored subscription should resume from the cursor held
    /// before the loss instead of a fresh service-assigned position.
    #[builder(default = "true")]
    pub catch_up_on_restore: bool,

    /// Whether an initial subscribe issued after a membership change should
    /// reuse the previous cursor, so updates published while the list changed
    /// are not lost.
    #[builder(default = "true")]
    pub keep_timetoken_on_list_change: bool,
}

impl SubscriberConfigBuilder {
    /// Build [`SubscriberConfig`] from the builder.
    pub fn build(self) -> Result<SubscriberConfig, RelayError> {
        self.build_internal()
            .map_err(|err| RelayError::SubscriberInitialization {
                details: err.to_string(),
            })
    }
}
