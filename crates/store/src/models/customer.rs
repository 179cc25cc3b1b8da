//! Customer and address models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use emporium_core::{BoundedText, CustomerId, Email, FieldError};

/// Maximum length of a first or last name.
pub const NAME_MAX: usize = 250;
/// Maximum length of a phone number.
pub const PHONE_MAX: usize = 15;
/// Maximum length of a province or city.
pub const REGION_MAX: usize = 250;
/// Maximum length of a street line.
pub const STREET_MAX: usize = 255;

/// A customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email (not unique).
    pub email: Email,
    /// Contact phone number.
    pub phone_number: String,
    /// Optional date of birth.
    pub birth_date: Option<NaiveDate>,
}

impl Customer {
    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated fields for creating or updating a customer.
#[derive(Debug, Clone)]
pub struct CustomerInput {
    pub first_name: BoundedText,
    pub last_name: BoundedText,
    pub email: Email,
    pub phone_number: BoundedText,
    pub birth_date: Option<NaiveDate>,
}

impl CustomerInput {
    /// Validate raw customer fields.
    ///
    /// Phone numbers may contain digits, spaces, `+`, `-`, `(` and `)`.
    /// Spaces, dashes and parentheses are dropped before the length check,
    /// so `+44 (20) 7946-0958` is stored as `+442079460958`.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] naming the first invalid field.
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: &str,
        birth_date: Option<NaiveDate>,
    ) -> Result<Self, FieldError> {
        let first_name = BoundedText::required("first_name", first_name, NAME_MAX)?;
        let last_name = BoundedText::required("last_name", last_name, NAME_MAX)?;
        let email = Email::parse(email.trim())
            .map_err(|e| FieldError::invalid("email", e.to_string()))?;
        let phone_number = normalize_phone(phone_number)?;
        Ok(Self {
            first_name,
            last_name,
            email,
            phone_number,
            birth_date,
        })
    }
}

/// Strip formatting from a phone number, keeping digits and `+`.
fn normalize_phone(raw: &str) -> Result<BoundedText, FieldError> {
    if let Some(bad) = raw
        .trim()
        .chars()
        .find(|c| !(c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')')))
    {
        return Err(FieldError::invalid(
            "phone_number",
            format!("character {bad:?} is not allowed"),
        ));
    }
    let compact: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    BoundedText::required("phone_number", &compact, PHONE_MAX)
}

/// A customer's postal address. At most one per customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    /// Owning customer; also the primary key.
    pub customer_id: CustomerId,
    pub province: String,
    pub city: String,
    pub street: String,
}

/// Validated address fields.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub province: BoundedText,
    pub city: BoundedText,
    pub street: BoundedText,
}

impl AddressInput {
    /// Validate raw address fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] for any blank or oversized field.
    pub fn new(province: &str, city: &str, street: &str) -> Result<Self, FieldError> {
        Ok(Self {
            province: BoundedText::required("province", province, REGION_MAX)?,
            city: BoundedText::required("city", city, REGION_MAX)?,
            street: BoundedText::required("street", street, STREET_MAX)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_input_valid() {
        let input = CustomerInput::new(
            "Ada",
            "Lovelace",
            "ada@Example.org",
            "+44 (20) 7946-0958",
            NaiveDate::from_ymd_opt(1815, 12, 10),
        )
        .unwrap();
        assert_eq!(input.email.as_str(), "ada@example.org");
        assert_eq!(input.phone_number.as_str(), "+442079460958");
    }

    #[test]
    fn test_phone_limit_counts_digits_only() {
        // 15 digits and a plus sign, formatted well past 15 characters.
        let err = CustomerInput::new(
            "Ada",
            "L",
            "ada@example.org",
            "+1 (234) 567-890-12345",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::TooLong { max: 15, actual: 16, .. }));

        let input =
            CustomerInput::new("Ada", "L", "ada@example.org", "(123) 456-789-012", None).unwrap();
        assert_eq!(input.phone_number.as_str(), "123456789012");

        let err = CustomerInput::new("Ada", "L", "ada@example.org", " - ( ) ", None).unwrap_err();
        assert_eq!(err, FieldError::Blank { field: "phone_number" });
    }

    #[test]
    fn test_customer_input_phone_rules() {
        let err = CustomerInput::new("Ada", "L", "ada@example.org", "call me", None).unwrap_err();
        assert_eq!(err.field(), "phone_number");

        let err =
            CustomerInput::new("Ada", "L", "ada@example.org", "1234567890123456", None).unwrap_err();
        assert!(matches!(err, FieldError::TooLong { max: 15, .. }));
    }

    #[test]
    fn test_customer_input_email_error_names_field() {
        let err = CustomerInput::new("Ada", "L", "not-an-email", "123", None).unwrap_err();
        assert_eq!(err.field(), "email");
    }

    #[test]
    fn test_full_name() {
        let customer = Customer {
            id: CustomerId::new(1),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: Email::parse("ada@example.org").unwrap(),
            phone_number: "123".to_owned(),
            birth_date: None,
        };
        assert_eq!(customer.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_address_limits() {
        assert!(AddressInput::new("Ontario", "Toronto", "1 Front St").is_ok());
        assert_eq!(
            AddressInput::new("Ontario", "", "1 Front St").unwrap_err(),
            FieldError::Blank { field: "city" }
        );
        assert!(AddressInput::new("Ontario", "Toronto", &"s".repeat(256)).is_err());
        assert!(AddressInput::new("Ontario", "Toronto", &"s".repeat(255)).is_ok());
    }
}
