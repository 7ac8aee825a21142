use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::{BookId, UserId};
use crate::error::AppError;

/// A star value between 1 and 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct StarRating(u8);

impl StarRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, AppError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(AppError::InvalidInput(format!(
                "rating must be between {} and {} stars, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for StarRating {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StarRating> for i64 {
    fn from(rating: StarRating) -> Self {
        rating.0 as i64
    }
}

impl FromStr for StarRating {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidInput(format!("rating must be a number, got '{}'", s)))?;
        Self::new(value)
    }
}

impl Display for StarRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reader's rating of one book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub book_id: BookId,
    pub stars: StarRating,
}

/// A rating joined with its book's publication year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowRating {
    pub book_id: BookId,
    pub stars: StarRating,
    pub publication_year: i32,
}

/// Mean rating of one book over every rating row it has
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageRating {
    pub book_id: BookId,
    pub average: f64,
    pub rating_count: usize,
}

/// One entry on a reader's to-read shelf
///
/// `title` is `None` when the shelf references a book missing from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToReadEntry {
    pub user_id: UserId,
    pub book_id: BookId,
    pub title: Option<String>,
}

/// Publication-year interval with strictly exclusive bounds
///
/// Bounds are kept as supplied; an inverted window is never swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// `start < year < end`
    pub fn contains(&self, year: i32) -> bool {
        self.start < year && year < self.end
    }

    /// True when at least one integer year lies strictly inside the window
    pub fn has_interior(&self) -> bool {
        (self.end as i64) - (self.start as i64) >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_rating_bounds() {
        assert_eq!(StarRating::new(1).unwrap().value(), 1);
        assert_eq!(StarRating::new(5).unwrap().value(), 5);
        assert!(StarRating::new(0).is_err());
        assert!(StarRating::new(6).is_err());
        assert!("3".parse::<StarRating>().is_ok());
        assert!("three".parse::<StarRating>().is_err());
    }

    #[test]
    fn test_star_rating_serde_rejects_out_of_range() {
        assert_eq!(serde_json::to_string(&StarRating::new(4).unwrap()).unwrap(), "4");
        assert!(serde_json::from_str::<StarRating>("9").is_err());
    }

    #[test]
    fn test_year_window_is_exclusive() {
        let window = YearWindow::new(1990, 2000);
        assert!(!window.contains(1990));
        assert!(window.contains(1991));
        assert!(window.contains(1999));
        assert!(!window.contains(2000));
    }

    #[test]
    fn test_year_window_interior() {
        assert!(YearWindow::new(1990, 1992).has_interior());
        assert!(!YearWindow::new(1990, 1991).has_interior());
        assert!(!YearWindow::new(1990, 1990).has_interior());
        assert!(!YearWindow::new(2000, 1990).has_interior());
        assert!(YearWindow::new(i32::MIN, i32::MAX).has_interior());
    }
}
