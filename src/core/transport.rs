//! # Transport module
//!
//! This module contains the [`Transport`] trait, which the subscriber core
//! uses to hand long-poll subscribe and leave requests to an actual network
//! layer, and the request / completion types exchanged with it.

use crate::subscribe::{result::SubscribeSuccessBody, types::StatusCategory};

/// Parameter bundle for a single long-poll subscribe request.
///
/// The subscriber core produces the path substitutions and query parameters;
/// composing them into a concrete URL is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    /// `{channels}` path substitution.
    ///
    /// Percent-encoded, comma-joined list of channel and presence channel
    /// names, or `","` when the client subscribes to channel groups only.
    pub channels: String,

    /// `{tt}` path substitution.
    ///
    /// Time token after which the service should deliver updates. `0` asks
    /// for a fresh, service-assigned position.
    pub timetoken: u64,

    /// `channel-group` query parameter (omitted when `None`).
    pub channel_groups: Option<String>,

    /// `heartbeat` query parameter (omitted when `None`).
    pub heartbeat: Option<u64>,

    /// `state` query parameter (omitted when `None`).
    ///
    /// Percent-encoded JSON object with per-channel presence state which the
    /// service re-announces on each subscribe.
    pub state: Option<String>,
}

/// Parameter bundle for an unsubscribe (leave) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    /// Percent-encoded, comma-joined channel names to leave.
    pub channels: Option<String>,

    /// `channel-group` query parameter with groups to leave.
    pub channel_groups: Option<String>,
}

/// Completion of a subscribe or leave request.
///
/// The transport classifies the outcome of every request it carries; the
/// subscriber core consumes the classification together with the decoded body
/// and drives the connection state machine from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribeCompletion {
    /// Classified outcome of the request.
    pub category: StatusCategory,

    /// Whether the completion represents an error.
    pub is_error: bool,

    /// Decoded response body of a successful subscribe.
    pub body: Option<SubscribeSuccessBody>,

    /// Human-readable failure description when `is_error` is set.
    pub error_details: Option<String>,
}

impl SubscribeCompletion {
    /// Successful completion wrapping a decoded body.
    pub fn success(body: SubscribeSuccessBody) -> Self {
        Self {
            category: StatusCategory::Acknowledgment,
            is_error: false,
            body: Some(body),
            error_details: None,
        }
    }

    /// Failed completion with the given classification.
    pub fn failure<S>(category: StatusCategory, details: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            category,
            is_error: true,
            body: None,
            error_details: Some(details.into()),
        }
    }

    /// Completion of a request which has been preempted by a newer one.
    pub fn cancelled() -> Self {
        Self {
            category: StatusCategory::Cancelled,
            is_error: false,
            body: None,
            error_details: None,
        }
    }
}

/// This trait is used to carry requests of the subscriber core to the
/// RelayMesh network.
///
/// Implementations own request execution and cancellation. Submitting a new
/// subscribe request implicitly cancels any in-flight one, which then
/// completes with the [`StatusCategory::Cancelled`] classification;
/// [`Transport::cancel_subscribe`] does the same without a replacement
/// request. A long-poll which outlives the transport's own timeout completes
/// with [`StatusCategory::Timeout`].
///
/// # Examples
/// ```
/// use relaymesh::core::{
///     LeaveRequest, SubscribeCompletion, SubscribeRequest, Transport,
/// };
///
/// struct MyTransport;
///
/// #[async_trait::async_trait]
/// impl Transport for MyTransport {
///     async fn subscribe(&self, request: SubscribeRequest) -> SubscribeCompletion {
///         // issue the long-poll and classify its outcome
///         # unimplemented!()
///     }
///
///     async fn leave(&self, request: LeaveRequest) -> SubscribeCompletion {
///         # unimplemented!()
///     }
///
///     fn cancel_subscribe(&self) {
///         // cancel in-flight long-polls
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Issue a long-poll subscribe request and resolve with its classified
    /// completion.
    async fn subscribe(&self, request: SubscribeRequest) -> SubscribeCompletion;

    /// Announce that the client leaves the given channels / channel groups.
    async fn leave(&self, request: LeaveRequest) -> SubscribeCompletion;

    /// Cancel in-flight subscribe long-polls.
    ///
    /// Cancelled requests complete with [`StatusCategory::Cancelled`].
    fn cancel_subscribe(&self);
}
