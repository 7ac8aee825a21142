use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::BookId;

/// A catalog book joined with its details, authors and genres
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    /// Original publication year; negative for BCE works
    pub publication_year: Option<i32>,
    pub language_code: Option<String>,
    /// Author names sorted by name; co-authored books list each one
    #[serde(default)]
    pub authors: Vec<String>,
    pub num_pages: Option<i64>,
    pub num_comments: Option<i64>,
    pub num_editions: Option<i64>,
    /// Genre labels sorted by label
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Book {
    /// Creates a book with only an identifier and title
    pub fn new(id: BookId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            publication_year: None,
            language_code: None,
            authors: Vec::new(),
            num_pages: None,
            num_comments: None,
            num_editions: None,
            genres: Vec::new(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.push(genre.into());
        self
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    /// Facet values usable as recommendation seeds, in genre → year → author order
    ///
    /// One value per distinct genre and author. Blank strings are treated as
    /// absent.
    pub fn facets(&self) -> Vec<FacetValue> {
        let mut facets: Vec<FacetValue> = Vec::new();

        push_distinct(&mut facets, &self.genres, FacetValue::Genre);

        if let Some(year) = self.publication_year {
            facets.push(FacetValue::Year(year));
        }

        push_distinct(&mut facets, &self.authors, FacetValue::Author);

        facets
    }

    /// Author names joined for display
    pub fn author_names(&self) -> Option<String> {
        if self.authors.is_empty() {
            None
        } else {
            Some(self.authors.join(", "))
        }
    }
}

fn push_distinct(
    facets: &mut Vec<FacetValue>,
    labels: &[String],
    facet: fn(String) -> FacetValue,
) {
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        let value = facet(label.to_string());
        if !facets.contains(&value) {
            facets.push(value);
        }
    }
}

/// Why a book was recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    SameGenre,
    SameYear,
    SameAuthor,
}

impl Display for MatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchReason::SameGenre => write!(f, "same_genre"),
            MatchReason::SameYear => write!(f, "same_year"),
            MatchReason::SameAuthor => write!(f, "same_author"),
        }
    }
}

/// A facet and the value a sibling book must share
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "facet", content = "value")]
pub enum FacetValue {
    Genre(String),
    Year(i32),
    Author(String),
}

impl FacetValue {
    pub fn reason(&self) -> MatchReason {
        match self {
            FacetValue::Genre(_) => MatchReason::SameGenre,
            FacetValue::Year(_) => MatchReason::SameYear,
            FacetValue::Author(_) => MatchReason::SameAuthor,
        }
    }

    /// Exact match of this facet against a book
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            FacetValue::Genre(genre) => book.genres.iter().any(|g| g == genre),
            FacetValue::Year(year) => book.publication_year == Some(*year),
            FacetValue::Author(author) => book.authors.iter().any(|a| a == author),
        }
    }
}

impl Display for FacetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetValue::Genre(genre) => write!(f, "genre={}", genre),
            FacetValue::Year(year) => write!(f, "year={}", year),
            FacetValue::Author(author) => write!(f, "author={}", author),
        }
    }
}

/// One recommended book and the facet it shares with the seed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationCandidate {
    pub book_id: BookId,
    pub title: String,
    pub reason: MatchReason,
}

/// Filters for the reader's book search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchCriteria {
    pub genre: String,
    pub language_code: String,
    /// Only books published strictly after this year
    pub published_after: i32,
}
