//! Error types for the arguments API client.
//!
//! # Design
//! Not-found only becomes an error where the caller's intent cannot be met
//! (update, delete); reads turn a 404 into `None` or an empty list instead.
//! 5xx responses get their own `Server` variant, every other unexpected
//! status lands in `Http` with the raw status code and body for debugging.

use thiserror::Error;

use crate::fetch::TransportError;
use crate::validation::ValidationError;

/// Errors returned by `ArgumentsClient` operations and `ArgumentsCodec`
/// parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The input was rejected locally; no request was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The server returned 404 for an argument that had to exist.
    #[error("The server returned a 404: {body}.")]
    NotFound { body: String },

    /// The server returned a 5xx status.
    #[error("The server responded with a {status}: {body}")]
    Server { status: u16, body: String },

    /// The server returned a non-2xx status other than 404 or 5xx.
    #[error("The server rejected the request with a {status}: {body}")]
    Http { status: u16, body: String },

    /// A response arrived but its body could not be read.
    #[error(
        "The server returned a {status}, and an error occurred while reading the response body: {message}."
    )]
    UnreadableBody { status: u16, message: String },

    /// The injected fetch capability failed before producing a response.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// A successful save or update came back without a `Location` header.
    #[error("the server response had no Location header")]
    MissingLocation,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The configured base URL is unusable.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}
