//! # Presence state store module
//!
//! This module contains the [`PresenceStateStore`] type which keeps the
//! per-channel / per-group presence state announced to the RelayMesh network
//! with every subscribe request. The subscriber core merges caller-supplied
//! state into the store before each cycle and clears entries on unsubscribe
//! or when membership is forgotten after a non-restorable failure.

use hashbrown::HashMap;
use serde_json::Value;
use spin::RwLock;

/// Per-object presence state.
///
/// Maps a channel or channel group name to the opaque JSON state associated
/// with the client's `user_id` on it.
pub type PresenceState = HashMap<String, Value>;

/// Store for per-object presence state.
///
/// State survives across subscribe cycles: the merge performed before each
/// request keeps previously announced entries for objects which are still
/// part of the subscription.
#[derive(Debug, Default)]
pub struct PresenceStateStore {
    entries: RwLock<PresenceState>,
}

impl PresenceStateStore {
    /// Merge caller-supplied state with the stored one over `objects`.
    ///
    /// For every object in `objects` the caller-supplied entry wins over the
    /// stored one. The merge result replaces the store contents, so entries
    /// for objects outside of the current subscription are retired.
    pub fn merge(&self, supplied: Option<&PresenceState>, objects: &[String]) -> PresenceState {
        let mut entries = self.entries.write();
        let merged: PresenceState = objects
            .iter()
            .filter_map(|object| {
                supplied
                    .and_then(|state| state.get(object))
                    .or_else(|| entries.get(object))
                    .map(|state| (object.clone(), state.clone()))
            })
            .collect();

        *entries = merged.clone();
        merged
    }

    /// Associate `state` with a single object.
    pub fn set(&self, object: &str, state: Value) {
        self.entries.write().insert(object.to_string(), state);
    }

    /// Retrieve state associated with `object`.
    pub fn get(&self, object: &str) -> Option<Value> {
        self.entries.read().get(object).cloned()
    }

    /// Forget state associated with each of `objects`.
    pub fn remove(&self, objects: &[String]) {
        let mut entries = self.entries.write();
        objects.iter().for_each(|object| {
            entries.remove(object);
        });
    }

    /// Whether the store holds no state.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use serde_json::json;

    fn objects(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn prefer_supplied_state_on_merge() {
        let store = PresenceStateStore::default();
        store.set("news", json!({"mood": "stale"}));

        let supplied = PresenceState::from([("news".to_string(), json!({"mood": "fresh"}))]);
        let merged = store.merge(Some(&supplied), &objects(&["news"]));

        assert_eq!(merged.get("news"), Some(&json!({"mood": "fresh"})));
        assert_eq!(store.get("news"), Some(json!({"mood": "fresh"})));
    }

    #[test]
    fn keep_stored_state_for_untouched_objects() {
        let store = PresenceStateStore::default();
        store.set("news", json!({"mood": "ok"}));

        let merged = store.merge(None, &objects(&["news", "alerts"]));

        assert_eq!(merged.get("news"), Some(&json!({"mood": "ok"})));
        assert!(!merged.contains_key("alerts"));
    }

    #[test]
    fn retire_entries_outside_of_subscription() {
        let store = PresenceStateStore::default();
        store.set("news", json!({"a": 1}));
        store.set("gone", json!({"b": 2}));

        store.merge(None, &objects(&["news"]));

        assert_eq!(store.get("gone"), None);
        assert_eq!(store.get("news"), Some(json!({"a": 1})));
    }

    #[test]
    fn remove_listed_objects() {
        let store = PresenceStateStore::default();
        store.set("news", json!(1));
        store.set("alerts", json!(2));

        store.remove(&objects(&["news", "unknown"]));

        assert_eq!(store.get("news"), None);
        assert_eq!(store.get("alerts"), Some(json!(2)));
        assert!(!store.is_empty());
    }
}
