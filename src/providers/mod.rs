//! Providers module
//!
//! Optional implementations of the crate's runtime abstraction.

#[cfg(feature = "tokio")]
pub mod futures_tokio;
