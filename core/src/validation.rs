//! Local checks run before any request leaves the client.
//!
//! A failed check means the call returns without touching the transport.

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{Argument, ArgumentUpdate, FetchSomeOptions};

/// Why an input was rejected before being sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("An argument must have a conclusion.")]
    MissingConclusion,

    #[error("An argument must have at least two premises.")]
    TooFewPremises,

    #[error("Arguments shouldn't use the same premise more than once. Yours repeats: {0}")]
    DuplicatePremise(String),

    #[error("Updates must change premises, a conclusion, or both.")]
    EmptyUpdate,

    #[error("A conclusion filter must not be empty.")]
    EmptyConclusionFilter,

    #[error("A search filter must not be empty.")]
    EmptySearchFilter,
}

/// Premises need at least two entries and no repeats. The first repeat in
/// input order is the one reported.
pub fn validate_premises<S: AsRef<str>>(premises: &[S]) -> Result<(), ValidationError> {
    if premises.len() < 2 {
        return Err(ValidationError::TooFewPremises);
    }
    let mut seen = HashSet::with_capacity(premises.len());
    for premise in premises {
        let premise = premise.as_ref();
        if !seen.insert(premise) {
            return Err(ValidationError::DuplicatePremise(premise.to_string()));
        }
    }
    Ok(())
}

pub fn validate_argument(argument: &Argument) -> Result<(), ValidationError> {
    if argument.conclusion.is_empty() {
        return Err(ValidationError::MissingConclusion);
    }
    validate_premises(&argument.premises)
}

/// An update must carry a non-empty conclusion, premises, or both. Present
/// premises follow the same rules as a full argument.
pub fn validate_update(update: &ArgumentUpdate) -> Result<(), ValidationError> {
    let has_conclusion = update.conclusion.as_deref().is_some_and(|c| !c.is_empty());
    if update.premises.is_none() && !has_conclusion {
        return Err(ValidationError::EmptyUpdate);
    }
    if update.conclusion.is_some() && !has_conclusion {
        return Err(ValidationError::MissingConclusion);
    }
    if let Some(premises) = &update.premises {
        validate_premises(premises)?;
    }
    Ok(())
}

/// Filters that are present must say something; an absent filter is fine.
pub fn validate_options(options: &FetchSomeOptions) -> Result<(), ValidationError> {
    if options.conclusion.as_deref() == Some("") {
        return Err(ValidationError::EmptyConclusionFilter);
    }
    if options.search.as_deref() == Some("") {
        return Err(ValidationError::EmptySearchFilter);
    }
    Ok(())
}
