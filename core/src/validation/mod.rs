//! Validation of wizard rows and tabs
//!
//! Row checks (`nic`, `disk`) produce an [`EntryValidation`] value that is
//! attached to the row. Tab checks (`networks`, `storage`, `settings`)
//! aggregate those values and turn them into actions for the reducer.

pub mod common;
pub mod disk;
pub mod networks;
pub mod nic;
pub mod settings;
pub mod storage;

use serde::{Deserialize, Serialize};

/// The input a validation message is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidatedField {
    Name,
    Model,
    MacAddress,
    Network,
    Bus,
    BootOrder,
    Volume,
    ContainerImage,
    Url,
    Size,
    PvcName,
    ProvisionSource,
    OperatingSystem,
    Flavor,
    WorkloadProfile,
    Cpu,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// A required value is missing
    Required,
    /// A value is present but not acceptable
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: ValidatedField,
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn required(field: ValidatedField, message: impl Into<String>) -> Self {
        Self {
            field,
            kind: ErrorKind::Required,
            message: message.into(),
        }
    }

    pub fn invalid(field: ValidatedField, message: impl Into<String>) -> Self {
        Self {
            field,
            kind: ErrorKind::Invalid,
            message: message.into(),
        }
    }
}

/// Verdict for one row or one form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryValidation {
    pub is_valid: bool,
    pub has_all_required_filled: bool,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl EntryValidation {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        let has_all_required_filled = !errors.iter().any(|e| e.kind == ErrorKind::Required);
        Self {
            is_valid: errors.is_empty(),
            has_all_required_filled,
            errors,
        }
    }

    pub fn error_for(&self, field: ValidatedField) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

/// Collects field errors, keeping only the first one per field
#[derive(Debug, Default)]
pub(crate) struct Errors(Vec<FieldError>);

impl Errors {
    pub(crate) fn push(&mut self, error: FieldError) {
        if !self.0.iter().any(|e| e.field == error.field) {
            self.0.push(error);
        }
    }

    pub(crate) fn has(&self, field: ValidatedField) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub(crate) fn finish(self) -> EntryValidation {
        EntryValidation::from_errors(self.0)
    }
}

/// Reduce row verdicts to a tab verdict: `(is_valid, has_all_required_filled)`
pub fn aggregate<'a>(
    mut validations: impl Iterator<Item = Option<&'a EntryValidation>> + Clone,
) -> (bool, bool) {
    let has_all_required_filled = validations
        .clone()
        .all(|v| v.is_some_and(|v| v.has_all_required_filled));
    let is_valid = validations.all(|v| v.is_some_and(|v| v.is_valid));
    (is_valid, has_all_required_filled)
}
