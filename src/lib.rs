#![deny(clippy::all)]
#![allow(clippy::doc_markdown)]

//! # RelayMesh subscriber core for Rust
//!
//! Client-side subscribe loop for the RelayMesh real-time messaging network.
//! The crate maintains the set of channels, channel groups and presence
//! channels the client listens on, drives long-poll subscribe requests with a
//! monotonically advancing time token cursor, dispatches received messages and
//! presence events to registered listeners, and manages reconnection, access
//! failures and catch-up across membership changes.
//!
//! The crate is transport-layer-agnostic: any type which implements the
//! [`Transport`] trait can carry the long-poll requests, and any async runtime
//! which implements the [`Runtime`] trait can host detached tasks (a Tokio
//! provider ships behind the `tokio` feature).
//!
//! ```no_run
//! use std::sync::Arc;
//! use relaymesh::{
//!     providers::futures_tokio::TokioRuntime, SubscriberBuilder, SubscriberConfigBuilder,
//! };
//! # use relaymesh::core::{
//! #     LeaveRequest, RelayError, SubscribeCompletion, SubscribeRequest, Transport,
//! # };
//! # use relaymesh::presence::HeartbeatActivity;
//! # use relaymesh::subscribe::{ListenerRegistry, MessageResult, PresenceResult, SubscribeStatus};
//! # struct MyTransport;
//! # #[async_trait::async_trait]
//! # impl Transport for MyTransport {
//! #     async fn subscribe(&self, _request: SubscribeRequest) -> SubscribeCompletion {
//! #         unimplemented!()
//! #     }
//! #     async fn leave(&self, _request: LeaveRequest) -> SubscribeCompletion {
//! #         unimplemented!()
//! #     }
//! #     fn cancel_subscribe(&self) {}
//! # }
//! # struct MyListeners;
//! # impl ListenerRegistry for MyListeners {
//! #     fn notify_status(&self, _status: SubscribeStatus) {}
//! #     fn notify_message(&self, _message: MessageResult, _status: Option<SubscribeStatus>) {}
//! #     fn notify_presence(&self, _presence: PresenceResult) {}
//! # }
//! # struct MyHeartbeat;
//! # impl HeartbeatActivity for MyHeartbeat {
//! #     fn start_if_required(&self) {}
//! #     fn stop_if_possible(&self) {}
//! # }
//! # fn main() -> Result<(), RelayError> {
//! let subscriber = SubscriberBuilder::default()
//!     .with_transport(Arc::new(MyTransport))
//!     .with_runtime(TokioRuntime)
//!     .with_listeners(Arc::new(MyListeners))
//!     .with_heartbeat(Arc::new(MyHeartbeat))
//!     .with_config(
//!         SubscriberConfigBuilder::default()
//!             .with_user_id("my-user-id")
//!             .build()?,
//!     )
//!     .build()?;
//!
//! subscriber.add_channels(&["lobby".into()]);
//! subscriber.subscribe(true, None);
//! # Ok(())
//! # }
//! ```

#[doc(inline)]
pub use config::{SubscriberConfig, SubscriberConfigBuilder};
pub mod config;

pub mod core;

pub mod presence;

pub mod providers;

#[doc(inline)]
pub use subscribe::{Subscriber, SubscriberBuilder};
pub mod subscribe;

#[doc(inline)]
pub use crate::core::{RelayError, Runtime, Transport};
