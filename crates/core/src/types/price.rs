//! Fixed-point product prices.
//!
//! Prices are stored as `NUMERIC(6, 2)`: at most four integer digits and
//! exactly two fractional digits. Line and cart totals are plain
//! [`Decimal`]s since they can legitimately exceed a single price's range.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::discount::DiscountRate;
use super::quantity::Quantity;
use super::text::FieldError;

/// A unit price in the store currency.
///
/// ```
/// use emporium_core::{DiscountRate, Price};
///
/// let price = Price::parse("19.99").unwrap();
/// let sale = price.apply_discount(DiscountRate::new(25.0).unwrap());
/// assert_eq!(sale.to_string(), "14.99");
///
/// assert!(Price::parse("10000.00").is_err());
/// assert!(Price::parse("1.999").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Total number of significant digits.
    pub const MAX_DIGITS: u32 = 6;
    /// Digits after the decimal point.
    pub const DECIMAL_PLACES: u32 = 2;
    /// Largest representable price.
    pub const MAX: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

    const FIELD: &'static str = "price";

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Invalid`] if the amount is negative, has more
    /// than two decimal places, or exceeds [`Self::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, FieldError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(FieldError::invalid(Self::FIELD, "cannot be negative"));
        }
        let normalized = amount.normalize();
        if normalized.scale() > Self::DECIMAL_PLACES {
            return Err(FieldError::invalid(
                Self::FIELD,
                format!("at most {} decimal places allowed", Self::DECIMAL_PLACES),
            ));
        }
        if amount > Self::MAX {
            return Err(FieldError::invalid(
                Self::FIELD,
                format!("must not exceed {}", Self::MAX),
            ));
        }
        let mut amount = amount.abs();
        amount.rescale(Self::DECIMAL_PLACES);
        Ok(Self(amount))
    }

    /// Parse a price from its decimal string form.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Invalid`] for unparseable input or any of the
    /// range errors of [`Self::new`].
    pub fn parse(s: &str) -> Result<Self, FieldError> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|e| FieldError::invalid(Self::FIELD, e.to_string()))?;
        Self::new(amount)
    }

    /// Build a price from an integer number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Invalid`] if the amount is out of range.
    pub fn from_cents(cents: i64) -> Result<Self, FieldError> {
        Self::new(Decimal::new(cents, Self::DECIMAL_PLACES))
    }

    /// The zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::from_parts(0, 0, 0, false, 2))
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage discount, rounding half away from zero to cents.
    #[must_use]
    pub fn apply_discount(self, rate: DiscountRate) -> Self {
        let factor = Decimal::ONE_HUNDRED - rate.as_decimal();
        let discounted = (self.0 * factor / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(Self::DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        // Shrinking a valid price by 0..=100% stays within range.
        Self(discounted.max(Decimal::ZERO))
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Decimal {
        self.0 * Decimal::from(quantity.get())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = FieldError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
