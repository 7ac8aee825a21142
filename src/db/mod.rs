//! Catalog store abstraction
//!
//! The recommendation and ranking services never talk to a database directly.
//! They receive a `&dyn CatalogStore` and issue typed, parameterized calls;
//! binding and connection handling stay behind this boundary.

use crate::{
    error::AppResult,
    models::{
        Book, BookId, FacetValue, Rating, SearchCriteria, ToReadEntry, UserId, WindowRating,
        YearWindow,
    },
};

pub mod memory;
pub mod mysql;

pub use memory::InMemoryCatalog;
pub use mysql::{create_pool, MySqlCatalog};

/// Read side of the books catalog
///
/// Every call is one independent read. Nothing here spans a transaction, so two
/// calls made for the same request may observe different catalog states.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Looks up one book by exact identifier, with its authors and genres
    async fn find_book_by_id(&self, id: &BookId) -> AppResult<Option<Book>>;

    /// All books sharing the facet value, in store order
    ///
    /// Excludes nothing; callers filter out their own seed. Books returned by
    /// list operations carry their authors but not their genres.
    async fn find_books_by_facet(&self, facet: &FacetValue) -> AppResult<Vec<Book>>;

    /// Every rating row recorded for a user, in store order
    async fn find_ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>>;

    /// Ratings whose book was published strictly inside the window
    ///
    /// Ratings referencing a book missing from the catalog are not returned.
    async fn find_ratings_in_year_window(&self, window: YearWindow) -> AppResult<Vec<WindowRating>>;

    /// Books in a genre and language published after a year, newest first
    async fn search_books(&self, criteria: &SearchCriteria) -> AppResult<Vec<Book>>;

    /// Books with an author whose name contains the fragment
    async fn find_books_by_author_like(&self, fragment: &str) -> AppResult<Vec<Book>>;

    /// A reader's to-read shelf, including entries whose book no longer exists
    async fn find_to_read_by_user(&self, user_id: UserId) -> AppResult<Vec<ToReadEntry>>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Write side used by the reader's shelf commands
#[async_trait::async_trait]
pub trait ShelfStore: Send + Sync {
    /// Records a rating, replacing an earlier rating of the same book where the
    /// store can detect one
    async fn upsert_rating(&self, rating: &Rating) -> AppResult<()>;

    /// Adds a to-read entry; returns `false` when the pair was already present
    async fn insert_to_read(&self, user_id: UserId, book_id: &BookId) -> AppResult<bool>;
}
