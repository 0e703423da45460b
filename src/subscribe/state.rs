//! # Subscriber state machine module
//!
//! The module contains the [`SubscriberState`] type, which describes the
//! connection lifecycle of the subscribe loop, and the transition relation
//! between states. Transitions outside of the relation are silently ignored.

use crate::subscribe::types::StatusCategory;

/// Connection lifecycle states of the subscribe loop.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SubscriberState {
    /// The loop has never received updates.
    #[default]
    Initialized,

    /// Successfully subscribed and receiving real-time updates.
    Connected,

    /// Updates receive stopped on user request.
    Disconnected,

    /// Updates receive stopped because of a network, TLS, timeout or
    /// malformed response failure.
    DisconnectedUnexpectedly,

    /// Service denied access to the requested channels or groups.
    AccessRightsError,
}

/// Transition targets of the subscribe loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum TargetState {
    Connected,
    Disconnected,
    DisconnectedUnexpectedly,
    AccessRightsError,
}

impl SubscriberState {
    /// Resolve a requested transition.
    ///
    /// Returns the state to store together with the status category the
    /// transition emits, or `None` when the transition is not part of the
    /// lifecycle relation.
    ///
    /// A completed-with-empty-set loop which has never connected keeps the
    /// `Initialized` state while still emitting `Disconnected`, so listeners
    /// observe a consistent lifecycle.
    pub(crate) fn transition(
        &self,
        target: TargetState,
    ) -> Option<(SubscriberState, StatusCategory)> {
        match (self, target) {
            (Self::Initialized | Self::Disconnected | Self::AccessRightsError, TargetState::Connected) => {
                Some((Self::Connected, StatusCategory::Connected))
            }
            (Self::DisconnectedUnexpectedly, TargetState::Connected) => {
                Some((Self::Connected, StatusCategory::Reconnected))
            }
            (Self::Initialized, TargetState::Disconnected) => {
                Some((Self::Initialized, StatusCategory::Disconnected))
            }
            (Self::Connected, TargetState::Disconnected) => {
                Some((Self::Disconnected, StatusCategory::Disconnected))
            }
            (Self::Initialized | Self::Connected, TargetState::DisconnectedUnexpectedly) => Some((
                Self::DisconnectedUnexpectedly,
                StatusCategory::UnexpectedDisconnect,
            )),
            (_, TargetState::AccessRightsError) => {
                Some((Self::AccessRightsError, StatusCategory::AccessDenied))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriberState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized => write!(f, "Initialized"),
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected => write!(f, "Disconnected"),
            Self::DisconnectedUnexpectedly => write!(f, "DisconnectedUnexpectedly"),
            Self::AccessRightsError => write!(f, "AccessRightsError"),
        }
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use test_case::test_case;

    #[test_case(
        SubscriberState::Initialized,
        Some((SubscriberState::Connected, StatusCategory::Connected));
        "first successful subscribe"
    )]
    #[test_case(
        SubscriberState::Disconnected,
        Some((SubscriberState::Connected, StatusCategory::Connected));
        "subscribe after explicit stop"
    )]
    #[test_case(
        SubscriberState::AccessRightsError,
        Some((SubscriberState::Connected, StatusCategory::Connected));
        "subscribe after denial retry"
    )]
    #[test_case(
        SubscriberState::DisconnectedUnexpectedly,
        Some((SubscriberState::Connected, StatusCategory::Reconnected));
        "subscribe after unexpected loss"
    )]
    #[test_case(SubscriberState::Connected, None; "already connected")]
    fn resolve_connect_transitions(
        from: SubscriberState,
        expected: Option<(SubscriberState, StatusCategory)>,
    ) {
        assert_eq!(from.transition(TargetState::Connected), expected);
    }

    #[test_case(
        SubscriberState::Initialized,
        Some((SubscriberState::Initialized, StatusCategory::Disconnected));
        "never connected keeps stored state"
    )]
    #[test_case(
        SubscriberState::Connected,
        Some((SubscriberState::Disconnected, StatusCategory::Disconnected));
        "connected loop stops"
    )]
    #[test_case(SubscriberState::DisconnectedUnexpectedly, None; "already lost")]
    #[test_case(SubscriberState::Disconnected, None; "already stopped")]
    fn resolve_disconnect_transitions(
        from: SubscriberState,
        expected: Option<(SubscriberState, StatusCategory)>,
    ) {
        assert_eq!(from.transition(TargetState::Disconnected), expected);
    }

    #[test_case(SubscriberState::Initialized, true; "before first connect")]
    #[test_case(SubscriberState::Connected, true; "while connected")]
    #[test_case(SubscriberState::Disconnected, false; "after explicit stop")]
    #[test_case(SubscriberState::DisconnectedUnexpectedly, false; "repeated loss")]
    fn resolve_unexpected_disconnect_transitions(from: SubscriberState, accepted: bool) {
        let transition = from.transition(TargetState::DisconnectedUnexpectedly);
        assert_eq!(transition.is_some(), accepted);

        if let Some((state, category)) = transition {
            assert_eq!(state, SubscriberState::DisconnectedUnexpectedly);
            assert_eq!(category, StatusCategory::UnexpectedDisconnect);
        }
    }

    #[test_case(SubscriberState::Initialized; "from initialized")]
    #[test_case(SubscriberState::Connected; "from connected")]
    #[test_case(SubscriberState::Disconnected; "from stopped")]
    #[test_case(SubscriberState::DisconnectedUnexpectedly; "from lost")]
    #[test_case(SubscriberState::AccessRightsError; "from denied")]
    fn accept_access_denial_from_any_state(from: SubscriberState) {
        assert_eq!(
            from.transition(TargetState::AccessRightsError),
            Some((
                SubscriberState::AccessRightsError,
                StatusCategory::AccessDenied
            ))
        );
    }
}
