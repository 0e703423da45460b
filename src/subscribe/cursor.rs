//! Subscription cursor module.

/// Time cursor of the subscribe loop.
///
/// `current` is the time token carried by the next subscribe request; `0`
/// requests a fresh, service-assigned position. `last` is a one-slot history
/// used for catch-up across membership changes and reconnects.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TimeCursor {
    current: u64,
    last: u64,
}

impl TimeCursor {
    /// Time token used by the next subscribe request.
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Previously used time token, kept for catch-up.
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Forget both positions.
    pub fn reset(&mut self) {
        self.current = 0;
        self.last = 0;
    }

    /// Move `current` into the catch-up slot and request a fresh position.
    pub fn promote_to_last(&mut self) {
        if self.current > 0 {
            self.last = self.current;
        }
        self.current = 0;
    }

    /// Resume from the catch-up slot instead of a service-assigned position.
    pub fn restore_from_last(&mut self) {
        self.current = self.last;
        self.last = 0;
    }

    /// Accept a new service-assigned position.
    ///
    /// The previous position moves into the catch-up slot. A repeated token
    /// (idle long-poll) leaves the slot untouched so history never aliases
    /// the current position.
    pub fn advance(&mut self, timetoken: u64) {
        if self.current > 0 && self.current != timetoken {
            self.last = self.current;
        }
        self.current = timetoken;
    }
}

#[cfg(test)]
mod should {
    use super::*;

    #[test]
    fn start_at_initial_position() {
        let cursor = TimeCursor::default();
        assert_eq!(cursor.current(), 0);
        assert_eq!(cursor.last(), 0);
    }

    #[test]
    fn keep_history_while_advancing() {
        let mut cursor = TimeCursor::default();
        cursor.advance(100);
        assert_eq!((cursor.current(), cursor.last()), (100, 0));

        cursor.advance(200);
        assert_eq!((cursor.current(), cursor.last()), (200, 100));
    }

    #[test]
    fn not_alias_history_on_repeated_token() {
        let mut cursor = TimeCursor::default();
        cursor.advance(100);
        cursor.advance(100);

        assert_eq!((cursor.current(), cursor.last()), (100, 0));
        assert!(cursor.last() == 0 || cursor.current() != cursor.last());
    }

    #[test]
    fn promote_only_meaningful_positions() {
        let mut cursor = TimeCursor::default();
        cursor.advance(100);
        cursor.advance(200);

        cursor.promote_to_last();
        assert_eq!((cursor.current(), cursor.last()), (0, 200));

        // Promotion of the initial position keeps the existing history.
        cursor.promote_to_last();
        assert_eq!((cursor.current(), cursor.last()), (0, 200));
    }

    #[test]
    fn restore_catch_up_position() {
        let mut cursor = TimeCursor::default();
        cursor.advance(100);
        cursor.promote_to_last();

        cursor.restore_from_last();
        assert_eq!((cursor.current(), cursor.last()), (100, 0));
    }

    #[test]
    fn forget_positions_on_reset() {
        let mut cursor = TimeCursor::default();
        cursor.advance(100);
        cursor.advance(200);

        cursor.reset();
        assert_eq!((cursor.current(), cursor.last()), (0, 0));
    }
}
