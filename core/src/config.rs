//! Client configuration: where the API lives and how to reach it.

use url::Url;

use crate::error::ApiError;

/// Everything an `ArgumentsClient` needs.
#[derive(Debug, Clone)]
pub struct ClientConfig<F> {
    /// Base URL of the arguments API, e.g. `https://arguments.example.com`.
    pub url: String,
    /// Transport used for every request.
    pub fetch: F,
}

impl<F> ClientConfig<F> {
    pub fn new(url: impl Into<String>, fetch: F) -> Self {
        Self {
            url: url.into(),
            fetch,
        }
    }

    /// Check that `url` is an absolute http(s) URL with no query or fragment.
    pub fn validate(&self) -> Result<(), ApiError> {
        let parsed = Url::parse(&self.url).map_err(|e| ApiError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: self.url.clone(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ApiError::InvalidUrl {
                url: self.url.clone(),
                message: "base URL must not carry a query or fragment".to_string(),
            });
        }
        Ok(())
    }
}
