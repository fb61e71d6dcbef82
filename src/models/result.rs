//! Outcome of a parse or generation step
//!
//! Problems are collected rather than raised: a conversion keeps going
//! after an unsupported flag and reports everything it noticed at the end.

use indexmap::IndexSet;
use serde::Serialize;

/// Payload plus the errors and warnings gathered while producing it
///
/// Messages are deduplicated and keep the order they were first reported in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub errors: IndexSet<String>,
    pub warnings: IndexSet<String>,
}

impl<T> ConvertResult<T> {
    pub fn success(data: T, warnings: IndexSet<String>) -> Self {
        Self {
            data: Some(data),
            errors: IndexSet::new(),
            warnings,
        }
    }

    pub fn failure(errors: IndexSet<String>, warnings: IndexSet<String>) -> Self {
        Self {
            data: None,
            errors,
            warnings,
        }
    }

    /// No errors were recorded; warnings do not count
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into a `Result`, keeping the warnings on both sides
    pub fn into_result(self) -> Result<(T, IndexSet<String>), (IndexSet<String>, IndexSet<String>)> {
        match self.data {
            Some(data) if self.errors.is_empty() => Ok((data, self.warnings)),
            _ => Err((self.errors, self.warnings)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConvertResult<U> {
        ConvertResult {
            data: self.data.map(f),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
