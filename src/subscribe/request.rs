//! # Subscribe request production module
//!
//! Builds the parameter bundle of the next long-poll request from the
//! subscription list snapshot, the cursor and the merged per-object presence
//! state.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{
    core::{LeaveRequest, RelayError, SubscribeRequest},
    presence::state::{PresenceState, PresenceStateStore},
};

/// RFC 3986 unreserved characters stay literal; everything else is
/// percent-encoded before it enters a request path or query value.
const URL_UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn percent_encoded(value: &str) -> String {
    utf8_percent_encode(value, URL_UNRESERVED).to_string()
}

/// Comma-joined list of individually encoded names, `None` when empty.
///
/// Names are encoded before joining, so a comma inside a channel name can't
/// collide with the list separator.
fn encoded_name_list(names: &[String]) -> Option<String> {
    (!names.is_empty()).then(|| {
        names
            .iter()
            .map(|name| percent_encoded(name))
            .collect::<Vec<String>>()
            .join(",")
    })
}

/// Produce the parameters of the next subscribe long-poll.
///
/// Caller-supplied presence state is merged into `store` over the union of
/// channels, presence channels and channel groups; the merge result is both
/// attached to the request and persisted for the following cycles.
pub(crate) fn subscribe_request(
    channel_names: &[String],
    channel_groups: &[String],
    timetoken: u64,
    supplied_state: Option<&PresenceState>,
    heartbeat_value: u64,
    store: &PresenceStateStore,
) -> Result<SubscribeRequest, RelayError> {
    let mut state_objects: Vec<String> = channel_names.to_vec();
    state_objects.extend(channel_groups.iter().cloned());

    let merged = store.merge(supplied_state, &state_objects);
    let state = if merged.is_empty() {
        None
    } else {
        let json = serde_json::to_string(&merged).map_err(|err| RelayError::Serialization {
            details: err.to_string(),
        })?;
        Some(percent_encoded(&json))
    };

    Ok(SubscribeRequest {
        channels: encoded_name_list(channel_names).unwrap_or_else(|| ",".to_string()),
        timetoken,
        channel_groups: encoded_name_list(channel_groups),
        heartbeat: (heartbeat_value > 0).then_some(heartbeat_value),
        state,
    })
}

/// Produce the parameters of an unsubscribe (leave) request.
pub(crate) fn leave_request(is_channels: bool, objects: &[String]) -> LeaveRequest {
    let joined = encoded_name_list(objects);

    LeaveRequest {
        channels: is_channels.then(|| joined.clone()).flatten(),
        channel_groups: (!is_channels).then_some(joined).flatten(),
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn join_channel_names_into_path() {
        let store = PresenceStateStore::default();
        let request = subscribe_request(
            &names(&["lobby", "lobby-pres"]),
            &[],
            100,
            None,
            0,
            &store,
        )
        .unwrap();

        assert_eq!(request.channels, "lobby,lobby-pres");
        assert_eq!(request.timetoken, 100);
        assert_eq!(request.channel_groups, None);
        assert_eq!(request.heartbeat, None);
        assert_eq!(request.state, None);
    }

    #[test]
    fn encode_reserved_characters_in_names() {
        let store = PresenceStateStore::default();
        let request = subscribe_request(
            &names(&["alerts feed", "a,b", "100%"]),
            &[],
            0,
            None,
            0,
            &store,
        )
        .unwrap();

        assert_eq!(request.channels, "alerts%20feed,a%2Cb,100%25");
    }

    #[test]
    fn place_comma_for_group_only_subscription() {
        let store = PresenceStateStore::default();
        let request =
            subscribe_request(&[], &names(&["friends", "family"]), 0, None, 0, &store).unwrap();

        assert_eq!(request.channels, ",");
        assert_eq!(request.channel_groups, Some("friends,family".to_string()));
    }

    #[test]
    fn attach_heartbeat_only_when_configured() {
        let store = PresenceStateStore::default();
        let with = subscribe_request(&names(&["lobby"]), &[], 0, None, 300, &store).unwrap();
        let without = subscribe_request(&names(&["lobby"]), &[], 0, None, 0, &store).unwrap();

        assert_eq!(with.heartbeat, Some(300));
        assert_eq!(without.heartbeat, None);
    }

    #[test]
    fn attach_merged_state_and_persist_it() {
        let store = PresenceStateStore::default();
        let supplied = PresenceState::from([("lobby".to_string(), json!({"mood": "ok"}))]);

        let request =
            subscribe_request(&names(&["lobby"]), &[], 0, Some(&supplied), 0, &store).unwrap();

        let encoded = request.state.unwrap();
        assert_eq!(encoded, "%7B%22lobby%22%3A%7B%22mood%22%3A%22ok%22%7D%7D");
        assert_eq!(store.get("lobby"), Some(json!({"mood": "ok"})));

        // Persisted state re-announces on the next cycle without new input.
        let next = subscribe_request(&names(&["lobby"]), &[], 100, None, 0, &store).unwrap();
        assert_eq!(next.state, Some(encoded));
    }

    #[test]
    fn build_leave_for_channels_or_groups() {
        let channels = leave_request(true, &names(&["lobby", "news"]));
        assert_eq!(channels.channels, Some("lobby,news".to_string()));
        assert_eq!(channels.channel_groups, None);

        let groups = leave_request(false, &names(&["friends"]));
        assert_eq!(groups.channels, None);
        assert_eq!(groups.channel_groups, Some("friends".to_string()));
    }
}
