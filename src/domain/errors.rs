use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Record not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Validation failed: {0}")]
    Validation(FormErrors),
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Admin privileges required")]
    Forbidden,
    #[error("The raffle has no participants")]
    NoParticipants,
    #[error("Deletion must be confirmed")]
    ConfirmationRequired,
    /// Rejection reported by the record store or object storage, kept verbatim.
    #[error("{0}")]
    Backend(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FormErrors> for DomainError {
    fn from(errors: FormErrors) -> Self {
        DomainError::Validation(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("is required")]
    Required,
    #[error("must be a number")]
    NotANumber,
    #[error("must be a whole number")]
    NotAnInteger,
    #[error("must be at least {0}")]
    BelowMinimum(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, FieldError>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldError)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub(crate) fn add(&mut self, field: &'static str, error: FieldError) {
        self.0.entry(field).or_insert(error);
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field} {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for FormErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (*k, v.to_string())))
    }
}
