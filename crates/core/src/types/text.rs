//! Length-checked text fields and the field-level validation error.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A validation failure on a single named field.
///
/// The field name is the column name, so a caller can map the error back to
/// the input that caused it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required value was blank.
    #[error("{field} cannot be blank")]
    Blank {
        /// Offending field.
        field: &'static str,
    },
    /// A value exceeded its maximum length (in characters).
    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum allowed characters.
        max: usize,
        /// Characters supplied.
        actual: usize,
    },
    /// A value was outside its allowed range or format.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl FieldError {
    /// Build an [`FieldError::Invalid`] for `field`.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// The column this error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Blank { field } | Self::TooLong { field, .. } | Self::Invalid { field, .. } => {
                field
            }
        }
    }
}

/// A string whose length has been checked against a column limit.
///
/// Leading and trailing whitespace is trimmed before the check. Lengths are
/// counted in characters, matching `VARCHAR(n)` semantics in `PostgreSQL`.
///
/// ```
/// use emporium_core::BoundedText;
///
/// let title = BoundedText::required("title", "  Coffee ", 250).unwrap();
/// assert_eq!(title.as_str(), "Coffee");
///
/// assert!(BoundedText::required("title", "   ", 250).is_err());
/// assert!(BoundedText::optional("description", "", 500).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundedText(String);

impl BoundedText {
    /// Validate a value that must not be blank.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Blank`] for empty input and
    /// [`FieldError::TooLong`] when the trimmed value exceeds `max` characters.
    pub fn required(field: &'static str, value: &str, max: usize) -> Result<Self, FieldError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Blank { field });
        }
        Self::check_len(field, trimmed, max)
    }

    /// Validate a value that may be blank.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TooLong`] when the trimmed value exceeds `max`
    /// characters.
    pub fn optional(field: &'static str, value: &str, max: usize) -> Result<Self, FieldError> {
        Self::check_len(field, value.trim(), max)
    }

    fn check_len(field: &'static str, value: &str, max: usize) -> Result<Self, FieldError> {
        let actual = value.chars().count();
        if actual > max {
            return Err(FieldError::TooLong { field, max, actual });
        }
        Ok(Self(value.to_owned()))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the value and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BoundedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BoundedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_accepts() {
        let text = BoundedText::required("name", "  Espresso  ", 10).unwrap();
        assert_eq!(text.as_str(), "Espresso");
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(
            BoundedText::required("name", " \t", 10),
            Err(FieldError::Blank { field: "name" })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Five characters, ten bytes.
        assert!(BoundedText::required("city", "Škoda", 5).is_ok());
        let err = BoundedText::required("city", "Škodas", 5).unwrap_err();
        assert_eq!(
            err,
            FieldError::TooLong {
                field: "city",
                max: 5,
                actual: 6
            }
        );
    }

    #[test]
    fn test_optional_allows_empty() {
        let text = BoundedText::optional("description", "", 500).unwrap();
        assert!(text.as_str().is_empty());
    }

    #[test]
    fn test_error_names_field() {
        let err = FieldError::invalid("price", "negative");
        assert_eq!(err.field(), "price");
        assert_eq!(err.to_string(), "price is invalid: negative");
    }
}
