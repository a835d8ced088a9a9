//! Error types for the pet store client.
//!
//! # Design
//! The three failure modes of a GraphQL exchange stay distinguishable:
//! a non-2xx status (`Status`), an envelope carrying application errors
//! (`Graphql`), and an envelope carrying neither errors nor data (`NoData`).
//! Per-item purchase failures are not errors at this level; they arrive as
//! data inside a successful `purchasePets` payload.

use thiserror::Error;

/// Errors returned by client parse methods and by `Transport` implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("request failed ({status})")]
    Status { status: u16, body: String },

    /// The envelope carried one or more application errors, joined by `", "`.
    #[error("{0}")]
    Graphql(String),

    /// The envelope carried neither `data` nor `errors`.
    #[error("no data returned")]
    NoData,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Invalid or missing configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("{key} has unrecognised value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Client-side validation failures for the add-pet form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("breeder email is invalid")]
    InvalidEmail,
}
