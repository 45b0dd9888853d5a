//! Async client for the arguments API.
//!
//! # Design
//! `ArgumentsClient` pairs an `ArgumentsCodec` with an injected `Fetch`
//! capability. Every operation builds its request first, so a validation
//! failure returns before the first `.await` and the transport is never
//! called. The client holds no mutable state; one instance can serve any
//! number of concurrent calls.

use tracing::{debug, warn};

use crate::codec::ArgumentsCodec;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::fetch::{Fetch, FetchResponse};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Argument, ArgumentResponse, ArgumentUpdate, FetchSomeOptions, SaveResponse, SomeArguments};

/// Whether a 404 body is worth reading for the operation at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotFoundBody {
    Skip,
    Read,
}

#[derive(Debug, Clone)]
pub struct ArgumentsClient<F> {
    codec: ArgumentsCodec,
    fetch: F,
}

impl<F: Fetch> ArgumentsClient<F> {
    pub fn new(config: ClientConfig<F>) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self {
            codec: ArgumentsCodec::new(&config.url),
            fetch: config.fetch,
        })
    }

    pub fn codec(&self) -> &ArgumentsCodec {
        &self.codec
    }

    /// Fetch the live version of an argument, or a specific `version`.
    /// `Ok(None)` when the server has no such argument.
    pub async fn get_one(&self, id: i64, version: Option<u32>) -> Result<Option<ArgumentResponse>, ApiError> {
        let request = self.codec.build_get_one(id, version);
        let response = self.execute(&request, NotFoundBody::Skip).await?;
        self.codec.parse_get_one(response)
    }

    /// Fetch the arguments matching `options`. An empty list when none do.
    pub async fn get_some(&self, options: &FetchSomeOptions) -> Result<SomeArguments, ApiError> {
        let request = self.codec.build_get_some(options).inspect_err(rejected)?;
        let response = self.execute(&request, NotFoundBody::Skip).await?;
        self.codec.parse_get_some(response)
    }

    /// Fetch every argument supporting `conclusion`.
    pub async fn get_all(&self, conclusion: &str) -> Result<SomeArguments, ApiError> {
        let options = FetchSomeOptions {
            conclusion: Some(conclusion.to_string()),
            ..Default::default()
        };
        self.get_some(&options).await
    }

    pub async fn save(&self, argument: &Argument) -> Result<SaveResponse, ApiError> {
        let request = self.codec.build_save(argument).inspect_err(rejected)?;
        let response = self.execute(&request, NotFoundBody::Read).await?;
        self.codec.parse_save(response)
    }

    /// Apply a merge patch to the argument with this ID, creating a new
    /// version. A missing argument is an error here, not `None`.
    pub async fn update(&self, id: i64, update: &ArgumentUpdate) -> Result<SaveResponse, ApiError> {
        let request = self.codec.build_update(id, update).inspect_err(rejected)?;
        let response = self.execute(&request, NotFoundBody::Read).await?;
        self.codec.parse_update(response)
    }

    /// Delete the argument and all of its versions.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let request = self.codec.build_delete(id);
        let response = self.execute(&request, NotFoundBody::Read).await?;
        self.codec.parse_delete(response)
    }

    /// Run one round-trip and read the body into a plain `HttpResponse`.
    async fn execute(&self, request: &HttpRequest, not_found: NotFoundBody) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.path, "sending request");
        let response = self.fetch.fetch(request).await?;
        let status = response.status();
        debug!(status, url = %request.path, "received response");

        let headers = response
            .header("location")
            .map(|value| vec![("location".to_string(), value)])
            .unwrap_or_default();
        if status == 404 && not_found == NotFoundBody::Skip {
            return Ok(HttpResponse {
                status,
                headers,
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(|e| ApiError::UnreadableBody {
            status,
            message: e.to_string(),
        })?;
        if (500..600).contains(&status) {
            warn!(status, url = %request.path, body = %body, "server error");
        }
        Ok(HttpResponse { status, headers, body })
    }
}

fn rejected(err: &ApiError) {
    debug!(error = %err, "request rejected before sending");
}
