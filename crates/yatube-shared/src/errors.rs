//! Field-level validation messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD: &str = "__all__";

/// Validation messages grouped by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record a message that is not tied to any field.
    pub fn add_general(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD, message);
    }

    /// Messages for one field, empty when the field is valid.
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn general(&self) -> &[String] {
        self.field(NON_FIELD)
    }

    pub fn has(&self, name: &str) -> bool {
        !self.field(name).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(value)` when no message was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_errors_pass_value_through() {
        let errors = FormErrors::new();
        assert_eq!(errors.into_result(7), Ok(7));
    }

    #[test]
    fn test_messages_grouped_by_field() {
        let mut errors = FormErrors::new();
        errors.add("text", "This field is required.");
        errors.add_general("Something else.");

        assert!(errors.has("text"));
        assert!(!errors.has("group"));
        assert_eq!(errors.field("text"), ["This field is required.".to_string()]);
        assert_eq!(errors.general().len(), 1);
        assert_eq!(
            errors.to_string(),
            "__all__: Something else.; text: This field is required."
        );
    }
}
