//! Domain DTOs for the arguments API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! Every value the server hands back is immutable from the client's point of
//! view: an update yields a new `ArgumentResponse` with a bumped `version`
//! rather than mutating a shared object.

use serde::{Deserialize, Serialize};

/// A conclusion plus the premises that support it.
///
/// Built on the client and sent to the server, which assigns identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Argument {
    pub conclusion: String,
    pub premises: Vec<String>,
}

impl Argument {
    pub fn new<C, P, I>(conclusion: C, premises: I) -> Self
    where
        C: Into<String>,
        P: Into<String>,
        I: IntoIterator<Item = P>,
    {
        Self {
            conclusion: conclusion.into(),
            premises: premises.into_iter().map(Into::into).collect(),
        }
    }
}

/// An argument as stored by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArgumentResponse {
    pub id: i64,
    pub version: u32,
    pub conclusion: String,
    pub premises: Vec<String>,
}

/// Merge patch for an existing argument. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArgumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premises: Option<Vec<String>>,
}

impl ArgumentUpdate {
    pub fn conclusion(conclusion: impl Into<String>) -> Self {
        Self {
            conclusion: Some(conclusion.into()),
            premises: None,
        }
    }

    pub fn premises<P, I>(premises: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = P>,
    {
        Self {
            conclusion: None,
            premises: Some(premises.into_iter().map(Into::into).collect()),
        }
    }
}

/// Filters for `GET /arguments`. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchSomeOptions {
    /// Only arguments supporting exactly this conclusion.
    pub conclusion: Option<String>,
    /// Only arguments whose conclusion uses every word of this query.
    pub search: Option<String>,
    /// Upper bound on the number of returned arguments.
    pub count: Option<u32>,
    /// Number of matching arguments the server skips before returning any.
    pub offset: Option<u32>,
    /// IDs which must not be returned.
    pub exclude: Vec<i64>,
}

/// Envelope of single-argument responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OneArgument {
    pub argument: ArgumentResponse,
}

/// Envelope of `GET /arguments` responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SomeArguments {
    pub arguments: Vec<ArgumentResponse>,
}

/// Result of a successful save or update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveResponse {
    /// Where the saved version of the argument can be found.
    pub location: String,
    pub argument: ArgumentResponse,
}
