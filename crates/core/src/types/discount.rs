//! Percentage discount rates.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::text::FieldError;

/// A percentage reduction between 0 and 100 inclusive.
///
/// Stored as `DOUBLE PRECISION`; converted to [`Decimal`] (four places)
/// whenever it is applied to money.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DiscountRate(f64);

impl DiscountRate {
    /// Largest rate.
    pub const MAX: f64 = 100.0;

    /// Validate a rate expressed in percent.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Invalid`] for non-finite values or values outside
    /// `0..=100`.
    pub fn new(percent: f64) -> Result<Self, FieldError> {
        if !percent.is_finite() {
            return Err(FieldError::invalid("discount", "must be a finite number"));
        }
        if !(0.0..=Self::MAX).contains(&percent) {
            return Err(FieldError::invalid(
                "discount",
                format!("must be between 0 and {}", Self::MAX),
            ));
        }
        Ok(Self(percent))
    }

    /// Returns the rate in percent.
    #[must_use]
    pub const fn percent(&self) -> f64 {
        self.0
    }

    /// Returns the rate as a decimal percentage rounded to four places.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::try_from(self.0)
            .map(|d| d.round_dp(4))
            .unwrap_or(Decimal::ZERO)
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<f64> for DiscountRate {
    type Error = FieldError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountRate> for f64 {
    fn from(rate: DiscountRate) -> Self {
        rate.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for DiscountRate {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <f64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for DiscountRate {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let percent = <f64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(percent)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for DiscountRate {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <f64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_range() {
        assert!(DiscountRate::new(0.0).is_ok());
        assert!(DiscountRate::new(100.0).is_ok());
        assert!(DiscountRate::new(-0.5).is_err());
        assert!(DiscountRate::new(100.1).is_err());
        assert!(DiscountRate::new(f64::NAN).is_err());
        assert!(DiscountRate::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_as_decimal_drops_float_noise() {
        let rate = DiscountRate::new(12.3).unwrap();
        assert_eq!(rate.as_decimal(), Decimal::from_str("12.3").unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(DiscountRate::new(15.0).unwrap().to_string(), "15%");
    }
}
