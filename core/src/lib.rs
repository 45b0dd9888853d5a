//! Client for the arguments HTTP API.
//!
//! # Overview
//! An argument is a conclusion plus at least two distinct premises. The
//! server stores them, versions every update, and serves them back; this
//! crate validates arguments locally, builds the requests, and turns the
//! server's responses into typed results.
//!
//! # Design
//! - `ArgumentsCodec` is stateless and does no I/O. Each operation is split
//!   into `build_*` (produces a request) and `parse_*` (consumes a response),
//!   so the I/O boundary is explicit.
//! - `ArgumentsClient` drives the codec through an injected `Fetch`
//!   capability. The crate ships no HTTP stack of its own.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod types;
pub mod validation;

pub use client::ArgumentsClient;
pub use codec::ArgumentsCodec;
pub use config::ClientConfig;
pub use error::ApiError;
pub use fetch::{Fetch, FetchResponse, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    Argument, ArgumentResponse, ArgumentUpdate, FetchSomeOptions, OneArgument, SaveResponse, SomeArguments,
};
pub use validation::{validate_argument, validate_options, validate_premises, validate_update, ValidationError};
