//! Core module
//!
//! Contains the error type and the runtime and transport abstractions shared
//! across the crate.

#[doc(inline)]
pub use error::RelayError;
pub mod error;

#[doc(inline)]
pub use runtime::Runtime;
pub mod runtime;

#[doc(inline)]
pub use transport::{LeaveRequest, SubscribeCompletion, SubscribeRequest, Transport};
pub mod transport;
