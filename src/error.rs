use std::fmt::Display;

use crate::models::BookId;

/// What a `NotFound` failure was looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// Identifier absent from the catalog
    Book(BookId),
    /// Menu key outside the curated shortlist
    Selection(String),
    /// Series key outside the popular-series list
    Series(String),
}

impl Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Book(id) => write!(f, "no book with isbn_10 '{}'", id),
            Missing::Selection(key) => write!(f, "invalid selection '{}'", key),
            Missing::Series(key) => write!(f, "unknown series '{}'", key),
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(Missing),

    #[error("Empty year window: no publication year lies strictly between {start} and {end}")]
    EmptyWindow { start: i32, end: i32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    /// True when the same request may succeed later without changing the input
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }

    /// Process exit status for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::NotFound(_) | AppError::EmptyWindow { .. } => 0,
            AppError::Output(_) => 1,
            AppError::InvalidInput(_) => 2,
            AppError::StoreUnavailable(_) => 3,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
