//! URL slugs for products.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::text::FieldError;

/// A URL-safe identifier made of ASCII letters, digits, hyphens and
/// underscores.
///
/// ```
/// use emporium_core::Slug;
///
/// assert_eq!(Slug::from_title("Dark Roast (250g)").unwrap().as_str(), "dark-roast-250g");
/// assert!(Slug::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 50;

    const FIELD: &'static str = "slug";

    /// Validate an explicit slug.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if the slug is blank, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, FieldError> {
        if s.is_empty() {
            return Err(FieldError::Blank { field: Self::FIELD });
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(FieldError::TooLong {
                field: Self::FIELD,
                max: Self::MAX_LENGTH,
                actual: s.chars().count(),
            });
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(FieldError::invalid(
                Self::FIELD,
                format!("character {bad:?} is not allowed"),
            ));
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a human-readable title.
    ///
    /// ASCII letters and digits are lowercased and kept; every other run of
    /// characters becomes a single hyphen. The result is trimmed of hyphens
    /// and truncated to [`Self::MAX_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Invalid`] if the title has no ASCII letters or
    /// digits to build a slug from.
    pub fn from_title(title: &str) -> Result<Self, FieldError> {
        let mut slug = String::with_capacity(title.len());
        let mut pending_hyphen = false;
        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        if slug.len() > Self::MAX_LENGTH {
            slug.truncate(Self::MAX_LENGTH);
            while slug.ends_with('-') {
                slug.pop();
            }
        }

        if slug.is_empty() {
            return Err(FieldError::invalid(
                Self::FIELD,
                format!("cannot derive a slug from {title:?}"),
            ));
        }
        Ok(Self(slug))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_slug_charset() {
        assert!(Slug::parse("house_blend-2").is_ok());
        assert!(Slug::parse("ABC").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Slug::parse(""), Err(FieldError::Blank { field: "slug" }));
        assert!(matches!(
            Slug::parse("caf\u{e9}"),
            Err(FieldError::Invalid { .. })
        ));
        assert!(matches!(
            Slug::parse(&"a".repeat(51)),
            Err(FieldError::TooLong { max: 50, .. })
        ));
    }

    #[test]
    fn test_from_title_collapses_separators() {
        let slug = Slug::from_title("  Ethiopia -- Yirgacheffe!! ").unwrap();
        assert_eq!(slug.as_str(), "ethiopia-yirgacheffe");
    }

    #[test]
    fn test_from_title_truncates_without_trailing_hyphen() {
        let title = format!("{} {}", "a".repeat(49), "bbbb");
        let slug = Slug::from_title(&title).unwrap();
        assert_eq!(slug.as_str(), "a".repeat(49));
    }

    #[test]
    fn test_from_title_requires_some_ascii() {
        assert!(Slug::from_title("!!!").is_err());
    }
}
