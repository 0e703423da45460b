//! # Error types
//!
//! This module contains the error types for the [`relaymesh`] crate.
//!
//! [`relaymesh`]: ../index.html

/// RelayMesh error type
///
/// This type is used to represent errors that can occur while the subscriber
/// core talks to the RelayMesh network. It is used as the error type for the
/// [`Result`] type.
///
/// [`Result`]: https://doc.rust-lang.org/std/result/enum.Result.html
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// this error is returned when the transport layer fails
    #[error("Transport error: {details}")]
    Transport {
        /// A message explaining what went wrong.
        details: String,
    },

    /// this error is returned when serialization of request data fails
    #[error("Serialization error: {details}")]
    Serialization {
        /// A message explaining what went wrong.
        details: String,
    },

    /// this error is returned when deserialization of the response fails
    #[error("Deserialization error: {details}")]
    Deserialization {
        /// A message explaining what went wrong.
        details: String,
    },

    /// this error is returned when a payload could not be decrypted
    #[error("Data decryption error: {details}")]
    Decryption {
        /// A message explaining what went wrong.
        details: String,
    },

    /// this error is returned when the initialization of the subscriber fails
    #[error("Subscriber initialization error: {details}")]
    SubscriberInitialization {
        /// A message explaining what went wrong.
        details: String,
    },

    /// this error is returned when the service rejects a subscribe request
    #[error("Service error: {message}")]
    Service {
        /// Operation status (HTTP) code.
        status: u16,

        /// A message explaining what went wrong.
        message: String,

        /// List of channels which is affected by error.
        affected_channels: Option<Vec<String>>,

        /// List of channel groups which is affected by error.
        affected_channel_groups: Option<Vec<String>>,
    },
}
