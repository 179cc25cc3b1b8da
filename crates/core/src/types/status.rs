//! Status enums for orders and product comments.
//!
//! Both are persisted as short codes in `TEXT` columns (`p`, `u`, `c` for
//! orders; `w`, `a`, `na` for comments) and carry a display label for
//! listings. Transition rules live here so every caller enforces the same
//! lifecycle.

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted status code is unknown.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} status code: {code:?}")]
pub struct StatusCodeError {
    /// Which status family was being parsed.
    pub kind: &'static str,
    /// The rejected code.
    pub code: String,
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment captured.
    Paid,
    /// Awaiting payment. Every new order starts here.
    #[default]
    Unpaid,
    /// Abandoned before payment.
    Canceled,
}

impl OrderStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Paid, Self::Unpaid, Self::Canceled];

    /// Code stored in the database.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Paid => "p",
            Self::Unpaid => "u",
            Self::Canceled => "c",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
            Self::Canceled => "Canceled",
        }
    }

    /// Parse a stored code.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCodeError`] for anything other than `p`, `u` or `c`.
    pub fn from_code(code: &str) -> Result<Self, StatusCodeError> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| StatusCodeError {
                kind: "order",
                code: code.to_owned(),
            })
    }

    /// Whether an order in this state may move to `next`.
    ///
    /// Only unpaid orders change state; paid and canceled are final.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Unpaid, Self::Paid | Self::Canceled))
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_final(self) -> bool {
        !matches!(self, Self::Unpaid)
    }
}

/// Moderation state of a product comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    /// Submitted, not yet reviewed.
    #[default]
    Waiting,
    /// Visible on the product page.
    Approved,
    /// Rejected by a moderator.
    NotApproved,
}

impl CommentStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Waiting, Self::Approved, Self::NotApproved];

    /// Code stored in the database.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Waiting => "w",
            Self::Approved => "a",
            Self::NotApproved => "na",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Approved => "Approved",
            Self::NotApproved => "Not approved",
        }
    }

    /// Parse a stored code.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCodeError`] for anything other than `w`, `a` or `na`.
    pub fn from_code(code: &str) -> Result<Self, StatusCodeError> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| StatusCodeError {
                kind: "comment",
                code: code.to_owned(),
            })
    }

    /// Whether a comment in this state may move to `next`.
    ///
    /// Moderation is a single decision taken on a waiting comment.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Waiting, Self::Approved | Self::NotApproved)
        )
    }
}

macro_rules! impl_status_text {
    ($ty:ty) => {
        impl ::core::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = StatusCodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_code(s)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $ty {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $ty {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, ::sqlx::error::BoxDynError> {
                let code = <&str as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self::from_code(code)?)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <&str as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
            }
        }
    };
}

impl_status_text!(OrderStatus);
impl_status_text!(CommentStatus);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defaults_to_unpaid() {
        assert_eq!(OrderStatus::default(), OrderStatus::Unpaid);
        assert_eq!(OrderStatus::default().code(), "u");
    }

    #[test]
    fn test_order_codes_parse_back() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_code(status.code()).unwrap(), status);
        }
        let err = OrderStatus::from_code("x").unwrap_err();
        assert_eq!(err.to_string(), "unknown order status code: \"x\"");
    }

    #[test]
    fn test_order_transitions() {
        assert!(OrderStatus::Unpaid.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Unpaid.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Unpaid));
        assert!(!OrderStatus::Canceled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Unpaid.can_transition_to(OrderStatus::Unpaid));
        assert!(OrderStatus::Paid.is_final());
        assert!(!OrderStatus::Unpaid.is_final());
    }

    #[test]
    fn test_comment_defaults_to_waiting() {
        assert_eq!(CommentStatus::default(), CommentStatus::Waiting);
        assert_eq!(CommentStatus::NotApproved.code(), "na");
    }

    #[test]
    fn test_comment_codes_parse_back() {
        for status in CommentStatus::ALL {
            assert_eq!(status.code().parse::<CommentStatus>().unwrap(), status);
        }
        assert!("approved".parse::<CommentStatus>().is_err());
    }

    #[test]
    fn test_comment_moderation_is_single_step() {
        assert!(CommentStatus::Waiting.can_transition_to(CommentStatus::Approved));
        assert!(CommentStatus::Waiting.can_transition_to(CommentStatus::NotApproved));
        assert!(!CommentStatus::Approved.can_transition_to(CommentStatus::NotApproved));
        assert!(!CommentStatus::NotApproved.can_transition_to(CommentStatus::Waiting));
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(OrderStatus::Canceled.to_string(), "Canceled");
        assert_eq!(CommentStatus::NotApproved.to_string(), "Not approved");
    }
}
