use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod book;
pub mod rating;

pub use book::{Book, MatchReason, FacetValue, RecommendationCandidate, SearchCriteria};
pub use rating::{AverageRating, Rating, StarRating, ToReadEntry, WindowRating, YearWindow};

/// Width of the stored `isbn_10` column
pub const ISBN_10_WIDTH: usize = 10;

/// Identifier for a book, stored as a fixed-width ISBN-10-like string
///
/// Legacy rows lost their leading zero during CSV export and carry a leading
/// space instead (e.g. `" 439554934"`), so the identifier is kept verbatim
/// rather than as a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Wraps an identifier exactly as the store holds it
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Normalizes user-typed input into the stored fixed-width form
    ///
    /// Accepts up to ten digits with an optional trailing `X` check digit and
    /// left-pads with spaces to [`ISBN_10_WIDTH`].
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let trimmed = input.trim();

        if trimmed.is_empty() || !trimmed.is_ascii() || trimmed.len() > ISBN_10_WIDTH {
            return Err(AppError::InvalidInput(format!(
                "isbn_10 must be 1 to {} characters, got '{}'",
                ISBN_10_WIDTH, trimmed
            )));
        }

        let (body, check) = trimmed.split_at(trimmed.len() - 1);
        let check_ok = check
            .chars()
            .all(|c| c.is_ascii_digit() || c == 'X' || c == 'x');
        if !body.chars().all(|c| c.is_ascii_digit()) || !check_ok {
            return Err(AppError::InvalidInput(format!(
                "isbn_10 may only contain digits and a trailing X, got '{}'",
                trimmed
            )));
        }

        Ok(Self(format!(
            "{:>width$}",
            trimmed.to_ascii_uppercase(),
            width = ISBN_10_WIDTH
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifier for a reader in the ratings and to-read tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| AppError::InvalidInput(format!("user_id must be an integer, got '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_parse_pads_legacy_identifier() {
        let id = BookId::parse("439554934").unwrap();
        assert_eq!(id.as_str(), " 439554934");
    }

    #[test]
    fn test_book_id_parse_trims_and_keeps_full_width() {
        let id = BookId::parse("  0439554934 ").unwrap();
        assert_eq!(id.as_str(), "0439554934");
    }

    #[test]
    fn test_book_id_parse_uppercases_check_digit() {
        let id = BookId::parse("080442957x").unwrap();
        assert_eq!(id.as_str(), "080442957X");
    }

    #[test]
    fn test_book_id_parse_rejects_garbage() {
        assert!(matches!(BookId::parse(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(BookId::parse("12345678901"), Err(AppError::InvalidInput(_))));
        assert!(matches!(BookId::parse("12X4"), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            BookId::parse("1' OR '1'='1"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_book_id_serde_is_transparent() {
        let id = BookId::new(" 345538374");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"" 345538374""#);
    }

    #[test]
    fn test_user_id_from_str() {
        assert_eq!("42".parse::<UserId>().unwrap(), UserId(42));
        assert!("forty-two".parse::<UserId>().is_err());
    }
}
