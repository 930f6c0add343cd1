//! Form validation results.
//!
//! Site forms never fail with an error page: invalid input is handed back to
//! the view as per-field messages and the form is rendered again.

use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

/// Field name used for errors that are not tied to a single input.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Message shown for a missing or blank value.
pub const REQUIRED: &str = "This field is required.";

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Validate `input`, collecting every failing field.
    pub fn check<T: Validate>(input: &T) -> Result<(), Self> {
        input.validate().map_err(Self::from)
    }

    /// Build errors for a single field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Add a message to a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Replace every message on a field with a single one.
    pub fn replace(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), vec![message.into()]);
    }

    /// Messages for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[][..], Vec::as_slice)
    }

    /// Whether `field` has at least one message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Self::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                out.add(field.as_ref(), describe(error));
            }
        }
        out
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "required" | "not_blank" => REQUIRED.to_string(),
        "email" => "Enter a valid email address.".to_string(),
        "length" => match error.params.get("max") {
            Some(max) => format!("Ensure this value has at most {max} characters."),
            None => "Ensure this value has a valid length.".to_string(),
        },
        code => format!("Invalid value ({code})."),
    }
}

/// Rejects empty and whitespace-only values.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Result of handling a submitted form.
#[derive(Debug)]
pub enum Submission<T> {
    /// The input was valid and has been acted on.
    Accepted(T),
    /// The input was rejected; nothing was written.
    Rejected(FormErrors),
}
