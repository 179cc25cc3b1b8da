//! Line-item quantities.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::text::FieldError;

/// A positive item count, stored as `SMALLINT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i16")]
pub struct Quantity(i16);

impl Quantity {
    /// Smallest allowed quantity.
    pub const MIN: i16 = 1;

    /// Validate a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Invalid`] unless `1 <= value <= i16::MAX`.
    pub fn new(value: i32) -> Result<Self, FieldError> {
        i16::try_from(value)
            .ok()
            .filter(|v| *v >= Self::MIN)
            .map(Self)
            .ok_or_else(|| {
                FieldError::invalid(
                    "quantity",
                    format!("must be between {} and {}", Self::MIN, i16::MAX),
                )
            })
    }

    /// Returns the quantity.
    #[must_use]
    pub const fn get(&self) -> i16 {
        self.0
    }

    /// Add two quantities, failing if the sum leaves the `SMALLINT` range.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Invalid`] on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, FieldError> {
        Self::new(i32::from(self.0) + i32::from(other.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = FieldError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i16 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i32::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
