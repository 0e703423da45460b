//! # Subscription list module
//!
//! This module contains the [`SubscriptionList`] type which tracks the
//! channels, channel groups and presence channels the client listens on, and
//! the naming helpers for the presence channel convention.

use hashbrown::HashSet;

/// Suffix which derives a presence channel name from a regular channel name.
pub const PRESENCE_CHANNEL_SUFFIX: &str = "-pres";

/// Whether `name` follows the presence channel naming convention.
pub fn is_presence_name(name: &str) -> bool {
    name.ends_with(PRESENCE_CHANNEL_SUFFIX)
}

/// Strip the presence suffix from `name`, if any.
pub fn presence_base(name: &str) -> &str {
    name.strip_suffix(PRESENCE_CHANNEL_SUFFIX).unwrap_or(name)
}

/// Presence channel name for the channel `name`.
pub fn presence_name(name: &str) -> String {
    if is_presence_name(name) {
        name.to_string()
    } else {
        format!("{name}{PRESENCE_CHANNEL_SUFFIX}")
    }
}

/// Channels, channel groups and presence channels the client listens on.
///
/// The three sets are disjoint by construction: a name following the presence
/// convention is stored in `presence_channels` even when passed to
/// [`SubscriptionList::add_channels`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct SubscriptionList {
    channels: HashSet<String>,
    channel_groups: HashSet<String>,
    presence_channels: HashSet<String>,
}

impl SubscriptionList {
    /// Add channels, routing presence-suffixed names into the presence set.
    pub fn add_channels(&mut self, names: &[String]) {
        for name in names {
            if is_presence_name(name) {
                self.presence_channels.insert(name.clone());
            } else {
                self.channels.insert(name.clone());
            }
        }
    }

    /// Remove the given names from both the channel and the presence set.
    ///
    /// The removal is name-based: each name is deleted from whichever set
    /// holds it.
    pub fn remove_channels(&mut self, names: &[String]) {
        for name in names {
            self.channels.remove(name);
            self.presence_channels.remove(name);
        }
    }

    pub fn add_channel_groups(&mut self, names: &[String]) {
        self.channel_groups.extend(names.iter().cloned());
    }

    pub fn remove_channel_groups(&mut self, names: &[String]) {
        for name in names {
            self.channel_groups.remove(name);
        }
    }

    /// Add presence channels for the given channel names.
    ///
    /// Accepts both base and already suffixed names.
    pub fn add_presence_channels(&mut self, names: &[String]) {
        self.presence_channels
            .extend(names.iter().map(|name| presence_name(name)));
    }

    /// Remove presence channels for the given channel names.
    ///
    /// Accepts both base and already suffixed names.
    pub fn remove_presence_channels(&mut self, names: &[String]) {
        for name in names {
            self.presence_channels.remove(&presence_name(name));
        }
    }

    /// Snapshot of regular channel names.
    pub fn channels(&self) -> Vec<String> {
        Self::sorted(self.channels.iter())
    }

    /// Snapshot of channel group names.
    pub fn channel_groups(&self) -> Vec<String> {
        Self::sorted(self.channel_groups.iter())
    }

    /// Snapshot of presence channel names.
    pub fn presence_channels(&self) -> Vec<String> {
        Self::sorted(self.presence_channels.iter())
    }

    /// Snapshot of channel and presence channel names, the way they appear in
    /// the subscribe request path.
    pub fn channel_names(&self) -> Vec<String> {
        Self::sorted(self.channels.iter().chain(self.presence_channels.iter()))
    }

    /// Snapshot of the entire subscribed universe: channels, presence
    /// channels and channel groups.
    pub fn all(&self) -> Vec<String> {
        Self::sorted(
            self.channels
                .iter()
                .chain(self.presence_channels.iter())
                .chain(self.channel_groups.iter()),
        )
    }

    /// Whether the client listens on nothing.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
            && self.channel_groups.is_empty()
            && self.presence_channels.is_empty()
    }

    /// Forget the entire membership.
    pub fn clear(&mut self) {
        self.channels.clear();
        self.channel_groups.clear();
        self.presence_channels.clear();
    }

    fn sorted<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
        let mut list: Vec<String> = names.cloned().collect();
        list.sort();
        list
    }
}

#[cfg(test)]
mod should {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn split_mixed_input_by_presence_suffix() {
        let mut list = SubscriptionList::default();
        list.add_channels(&names(&["lobby", "lobby-pres", "news"]));

        assert_eq!(list.channels(), names(&["lobby", "news"]));
        assert_eq!(list.presence_channels(), names(&["lobby-pres"]));
    }

    #[test]
    fn keep_channel_and_presence_sets_disjoint() {
        let mut list = SubscriptionList::default();
        list.add_channels(&names(&["lobby", "lobby-pres"]));
        list.add_presence_channels(&names(&["news"]));

        for channel in list.channels() {
            assert!(!list.presence_channels().contains(&channel));
        }
    }

    #[test]
    fn remove_names_from_both_sets() {
        let mut list = SubscriptionList::default();
        list.add_channels(&names(&["lobby", "lobby-pres", "news"]));
        list.remove_channels(&names(&["lobby", "lobby-pres"]));

        assert_eq!(list.channels(), names(&["news"]));
        assert!(list.presence_channels().is_empty());
    }

    #[test]
    fn normalize_presence_channel_names() {
        let mut list = SubscriptionList::default();
        list.add_presence_channels(&names(&["lobby", "news-pres"]));

        assert_eq!(list.presence_channels(), names(&["lobby-pres", "news-pres"]));

        list.remove_presence_channels(&names(&["lobby-pres", "news"]));
        assert!(list.presence_channels().is_empty());
    }

    #[test]
    fn leave_no_trace_after_add_remove_round_trip() {
        let mut list = SubscriptionList::default();
        list.add_channels(&names(&["lobby"]));
        list.add_channel_groups(&names(&["friends"]));

        let mut mutated = list.clone();
        mutated.add_channels(&names(&["news", "news-pres"]));
        mutated.add_channel_groups(&names(&["family"]));
        mutated.remove_channels(&names(&["news", "news-pres"]));
        mutated.remove_channel_groups(&names(&["family"]));

        assert_eq!(mutated, list);
    }

    #[test]
    fn report_subscribed_universe() {
        let mut list = SubscriptionList::default();
        assert!(list.is_empty());

        list.add_channels(&names(&["lobby"]));
        list.add_presence_channels(&names(&["lobby"]));
        list.add_channel_groups(&names(&["friends"]));

        assert_eq!(list.channel_names(), names(&["lobby", "lobby-pres"]));
        assert_eq!(list.all(), names(&["friends", "lobby", "lobby-pres"]));

        list.clear();
        assert!(list.is_empty());
    }
}
