//! Subscribe result module.
//!
//! This module contains types of the decoded subscribe response body. The
//! transport layer decodes the raw service response into
//! [`SubscribeResponseBody`] and hands the success body to the subscriber
//! core, which consumes already-parsed event records.

use serde_json::Value;

use crate::{core::RelayError, subscribe::types::PresenceAction};

/// Raw service response for a subscribe request.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum SubscribeResponseBody {
    /// Success response body with the next time cursor and the batch of
    /// updates received since the previous cursor.
    ///
    /// # Example
    /// ```json
    /// {
    ///     "tt": "16866076578137008",
    ///     "events": [
    ///         {
    ///             "subscribed_channel": "lobby",
    ///             "actual_channel": "lobby",
    ///             "payload": { "sender": "moon", "text": "hello" }
    ///         }
    ///     ]
    /// }
    /// ```
    SuccessResponse(SubscribeSuccessBody),

    /// Error response body with details of what exactly was wrong.
    ///
    /// # Example
    /// ```json
    /// {
    ///     "message": "Forbidden",
    ///     "error": true,
    ///     "status": 403,
    ///     "payload": {
    ///         "channels": ["restricted"]
    ///     }
    /// }
    /// ```
    ErrorResponse(ServiceErrorBody),
}

/// Content of a successful subscribe operation.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct SubscribeSuccessBody {
    /// Next subscription cursor.
    #[serde(rename = "tt", deserialize_with = "deserialize_timetoken")]
    pub timetoken: u64,

    /// Updates received since the previous cursor, in service order.
    #[serde(default)]
    pub events: Vec<Envelope>,
}

/// Single entry from a subscribe response batch.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Envelope {
    /// Name of the subscription through which the event has been delivered.
    ///
    /// Set to a channel group name when the event arrived through a group.
    /// Some service responses omit the field.
    #[serde(default)]
    pub subscribed_channel: Option<String>,

    /// Channel on which the event has been published.
    #[serde(default)]
    pub actual_channel: Option<String>,

    /// Decoded message payload.
    ///
    /// Absent for presence events.
    #[serde(default)]
    pub payload: Option<Value>,

    /// Presence descriptor.
    ///
    /// Absent for regular messages.
    #[serde(default)]
    pub presence: Option<PresenceBody>,

    /// Set by the decrypting layer when the payload could not be decrypted.
    ///
    /// The event is still delivered; a non-fatal
    /// [`DecryptionError`](crate::subscribe::StatusCategory::DecryptionError)
    /// status accompanies it.
    #[serde(skip)]
    pub decryption_error: Option<String>,
}

/// Presence descriptor carried by presence channel events.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct PresenceBody {
    /// What happened to the user's presence.
    pub presence_event: PresenceAction,

    /// Identity of the user for which the event has been generated.
    pub uuid: String,

    /// State associated with the user on the channel (`state-change` only).
    #[serde(default)]
    pub state: Option<Value>,

    /// Unix timestamp at which the service generated the event.
    #[serde(default)]
    pub timestamp: Option<u64>,

    /// Channel occupancy after the change.
    #[serde(default)]
    pub occupancy: Option<u64>,
}

/// Error response body of the subscribe service.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ServiceErrorBody {
    /// Operation status (HTTP) code.
    pub status: u16,

    /// Whether response represents an error.
    pub error: bool,

    /// A message explaining what went wrong.
    pub message: String,

    /// Affected objects.
    #[serde(default)]
    pub payload: Option<ServiceErrorPayload>,
}

/// Objects affected by a service error.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct ServiceErrorPayload {
    /// List of channels which is affected by error.
    #[serde(default)]
    pub channels: Vec<String>,

    /// List of channel groups which is affected by error.
    #[serde(default, rename = "channel-groups")]
    pub channel_groups: Vec<String>,
}

impl From<ServiceErrorBody> for RelayError {
    fn from(value: ServiceErrorBody) -> Self {
        let payload = value.payload.unwrap_or_default();
        RelayError::Service {
            status: value.status,
            message: value.message,
            affected_channels: (!payload.channels.is_empty()).then_some(payload.channels),
            affected_channel_groups: (!payload.channel_groups.is_empty())
                .then_some(payload.channel_groups),
        }
    }
}

impl TryFrom<SubscribeResponseBody> for SubscribeSuccessBody {
    type Error = RelayError;

    fn try_from(value: SubscribeResponseBody) -> Result<Self, Self::Error> {
        match value {
            SubscribeResponseBody::SuccessResponse(body) => Ok(body),
            SubscribeResponseBody::ErrorResponse(body) => Err(body.into()),
        }
    }
}

/// The service reports the time token either as a decimal string or as a
/// number; both parse into a 64-bit value.
fn deserialize_timetoken<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Timetoken {
        String(String),
        Number(u64),
    }

    match Timetoken::deserialize(deserializer)? {
        Timetoken::String(value) => value.parse::<u64>().map_err(serde::de::Error::custom),
        Timetoken::Number(value) => Ok(value),
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_success_body_with_string_timetoken() {
        let body: SubscribeResponseBody = serde_json::from_value(json!({
            "tt": "15628652479932717",
            "events": [
                {
                    "subscribed_channel": "lobby",
                    "actual_channel": "lobby",
                    "payload": "my message"
                }
            ]
        }))
        .unwrap();

        let success = SubscribeSuccessBody::try_from(body).unwrap();
        assert_eq!(success.timetoken, 15_628_652_479_932_717);
        assert_eq!(success.events.len(), 1);
        assert_eq!(success.events[0].payload, Some(json!("my message")));
        assert_eq!(success.events[0].presence, None);
    }

    #[test]
    fn decode_success_body_with_numeric_timetoken() {
        let body: SubscribeSuccessBody =
            serde_json::from_value(json!({ "tt": 100, "events": [] })).unwrap();

        assert_eq!(body.timetoken, 100);
        assert!(body.events.is_empty());
    }

    #[test]
    fn decode_presence_envelope() {
        let body: SubscribeSuccessBody = serde_json::from_value(json!({
            "tt": "200",
            "events": [
                {
                    "subscribed_channel": "lobby-pres",
                    "actual_channel": "lobby-pres",
                    "presence": {
                        "presence_event": "state-change",
                        "uuid": "moon",
                        "state": { "mood": "ok" },
                        "timestamp": 1_690_000_000u64
                    }
                }
            ]
        }))
        .unwrap();

        let presence = body.events[0].presence.as_ref().unwrap();
        assert_eq!(presence.presence_event, PresenceAction::StateChange);
        assert_eq!(presence.uuid, "moon");
        assert_eq!(presence.state, Some(json!({ "mood": "ok" })));
    }

    #[test]
    fn decode_error_body_into_service_error() {
        let body: SubscribeResponseBody = serde_json::from_value(json!({
            "message": "Forbidden",
            "error": true,
            "status": 403,
            "payload": { "channels": ["restricted"] }
        }))
        .unwrap();

        let error = SubscribeSuccessBody::try_from(body).unwrap_err();
        assert!(matches!(
            error,
            RelayError::Service { status: 403, ref affected_channels, .. }
                if affected_channels == &Some(vec!["restricted".to_string()])
        ));
    }
}
