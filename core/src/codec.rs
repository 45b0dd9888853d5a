//! Stateless HTTP request builder and response parser for the arguments API.
//!
//! # Design
//! `ArgumentsCodec` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Builders run local validation, so an invalid input never
//! yields a request at all.
//!
//! Status handling, in order: 5xx is always `ApiError::Server`; 404 means
//! "absent" for reads and `ApiError::NotFound` for writes; any other non-2xx
//! is `ApiError::Http`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Argument, ArgumentResponse, ArgumentUpdate, FetchSomeOptions, OneArgument, SaveResponse, SomeArguments,
};
use crate::validation::{validate_argument, validate_options, validate_update};

/// Synchronous, stateless codec for the arguments API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentsCodec {
    base_url: String,
}

impl ArgumentsCodec {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/arguments/{id}`, or a specific version when `version` is
    /// positive.
    pub fn build_get_one(&self, id: i64, version: Option<u32>) -> HttpRequest {
        let mut path = format!("{}/arguments/{id}", self.base_url);
        if let Some(version) = version.filter(|v| *v > 0) {
            path.push_str(&format!("/version/{version}"));
        }
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_some(&self, options: &FetchSomeOptions) -> Result<HttpRequest, ApiError> {
        validate_options(options)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/arguments{}", self.base_url, query_string(options)),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_save(&self, argument: &Argument) -> Result<HttpRequest, ApiError> {
        validate_argument(argument)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/arguments", self.base_url),
            headers: json_headers(),
            body: Some(encode(argument)?),
        })
    }

    pub fn build_update(&self, id: i64, update: &ArgumentUpdate) -> Result<HttpRequest, ApiError> {
        validate_update(update)?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: format!("{}/arguments/{id}", self.base_url),
            headers: json_headers(),
            body: Some(encode(update)?),
        })
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/arguments/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_get_one(&self, response: HttpResponse) -> Result<Option<ArgumentResponse>, ApiError> {
        check_server_error(&response)?;
        if response.status == 404 {
            return Ok(None);
        }
        check_success(&response)?;
        let envelope: OneArgument = decode(&response.body)?;
        Ok(Some(envelope.argument))
    }

    pub fn parse_get_some(&self, response: HttpResponse) -> Result<SomeArguments, ApiError> {
        check_server_error(&response)?;
        if response.status == 404 {
            return Ok(SomeArguments::default());
        }
        check_success(&response)?;
        decode(&response.body)
    }

    pub fn parse_save(&self, response: HttpResponse) -> Result<SaveResponse, ApiError> {
        check_server_error(&response)?;
        check_success(&response)?;
        saved(response)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<SaveResponse, ApiError> {
        check_server_error(&response)?;
        check_not_found(&response)?;
        check_success(&response)?;
        saved(response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_server_error(&response)?;
        check_not_found(&response)?;
        check_success(&response)
    }
}

/// `?key=value&...` for every present filter, or an empty string.
fn query_string(options: &FetchSomeOptions) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(conclusion) = &options.conclusion {
        pairs.push(("conclusion", conclusion.clone()));
    }
    if let Some(search) = &options.search {
        pairs.push(("search", search.clone()));
    }
    if let Some(count) = options.count {
        pairs.push(("count", count.to_string()));
    }
    if let Some(offset) = options.offset {
        pairs.push(("offset", offset.to_string()));
    }
    if !options.exclude.is_empty() {
        let ids: Vec<String> = options.exclude.iter().map(i64::to_string).collect();
        pairs.push(("exclude", ids.join(",")));
    }
    if pairs.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
        .collect();
    format!("?{}", joined.join("&"))
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn check_server_error(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_server_error() {
        return Err(ApiError::Server {
            status: response.status,
            body: response.body.clone(),
        });
    }
    Ok(())
}

fn check_not_found(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Ok(())
}

fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn saved(response: HttpResponse) -> Result<SaveResponse, ApiError> {
    let location = response.header("location").ok_or(ApiError::MissingLocation)?.to_string();
    let envelope: OneArgument = decode(&response.body)?;
    Ok(SaveResponse {
        location,
        argument: envelope.argument,
    })
}
