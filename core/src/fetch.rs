//! The injected transport capability.
//!
//! `ArgumentsClient` never talks to the network itself. It hands each
//! `HttpRequest` to a `Fetch` implementation and reads the status, headers
//! and body back through `FetchResponse`. Reading the body is a separate,
//! fallible step so a failure there can be told apart from a failed request.

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// Failure reported by a `Fetch` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Executes HTTP requests on behalf of the client.
#[async_trait]
pub trait Fetch: Send + Sync {
    type Response: FetchResponse;

    async fn fetch(&self, request: &HttpRequest) -> Result<Self::Response, TransportError>;
}

/// A response whose body may not have been read yet.
#[async_trait]
pub trait FetchResponse: Send {
    fn status(&self) -> u16;

    fn header(&self, name: &str) -> Option<String>;

    /// Consume the response and return its body as text.
    async fn text(self) -> Result<String, TransportError>;
}

#[async_trait]
impl FetchResponse for HttpResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<String> {
        HttpResponse::header(self, name).map(str::to_string)
    }

    async fn text(self) -> Result<String, TransportError> {
        Ok(self.body)
    }
}
