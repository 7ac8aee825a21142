//! InMemoryCatalog - Vec-backed catalog store for tests and local fixtures.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::{CatalogStore, ShelfStore},
    error::AppResult,
    models::{
        Book, BookId, FacetValue, Rating, SearchCriteria, ToReadEntry, UserId, WindowRating,
        YearWindow,
    },
};

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    ratings: Vec<Rating>,
    to_read: Vec<(UserId, BookId)>,
}

/// In-memory catalog preserving insertion order as store order.
///
/// Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from fixture books and ratings.
    pub fn with_data(books: Vec<Book>, ratings: Vec<Rating>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                books,
                ratings,
                to_read: Vec::new(),
            })),
        }
    }

    pub async fn insert_book(&self, book: Book) {
        self.tables.write().await.books.push(book);
    }

    /// Appends a rating row as-is, duplicates included.
    pub async fn insert_rating(&self, rating: Rating) {
        self.tables.write().await.ratings.push(rating);
    }

    /// List results carry authors but no genres, matching the SQL store.
    fn listed(book: &Book) -> Book {
        Book {
            genres: Vec::new(),
            ..book.clone()
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_book_by_id(&self, id: &BookId) -> AppResult<Option<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.iter().find(|b| &b.id == id).cloned())
    }

    async fn find_books_by_facet(&self, facet: &FacetValue) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .iter()
            .filter(|b| facet.matches(b))
            .map(Self::listed)
            .collect())
    }

    async fn find_ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_ratings_in_year_window(
        &self,
        window: YearWindow,
    ) -> AppResult<Vec<WindowRating>> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .iter()
            .filter_map(|r| {
                let book = tables.books.iter().find(|b| b.id == r.book_id)?;
                let publication_year = book.publication_year?;
                window.contains(publication_year).then(|| WindowRating {
                    book_id: r.book_id.clone(),
                    stars: r.stars,
                    publication_year,
                })
            })
            .collect())
    }

    async fn search_books(&self, criteria: &SearchCriteria) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        let genre = FacetValue::Genre(criteria.genre.clone());
        let mut found: Vec<Book> = tables
            .books
            .iter()
            .filter(|b| genre.matches(b))
            .filter(|b| b.language_code.as_deref() == Some(criteria.language_code.as_str()))
            .filter(|b| matches!(b.publication_year, Some(y) if y > criteria.published_after))
            .map(Self::listed)
            .collect();

        found.sort_by(|a, b| b.publication_year.cmp(&a.publication_year));
        Ok(found)
    }

    async fn find_books_by_author_like(&self, fragment: &str) -> AppResult<Vec<Book>> {
        // LIKE under the default collation ignores case
        let fragment = fragment.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .iter()
            .filter(|b| b.authors.iter().any(|a| a.to_lowercase().contains(&fragment)))
            .map(Self::listed)
            .collect())
    }

    async fn find_to_read_by_user(&self, user_id: UserId) -> AppResult<Vec<ToReadEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .to_read
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(user, book_id)| ToReadEntry {
                user_id: *user,
                book_id: book_id.clone(),
                title: tables
                    .books
                    .iter()
                    .find(|b| &b.id == book_id)
                    .map(|b| b.title.clone()),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait::async_trait]
impl ShelfStore for InMemoryCatalog {
    async fn upsert_rating(&self, rating: &Rating) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .ratings
            .iter()
            .position(|r| r.user_id == rating.user_id && r.book_id == rating.book_id);

        match existing {
            Some(index) => tables.ratings[index].stars = rating.stars,
            None => tables.ratings.push(rating.clone()),
        }
        Ok(())
    }

    async fn insert_to_read(&self, user_id: UserId, book_id: &BookId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables
            .to_read
            .iter()
            .any(|(user, book)| *user == user_id && book == book_id)
        {
            return Ok(false);
        }
        tables.to_read.push((user_id, book_id.clone()));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StarRating;

    fn rating(user: i64, book: &str, stars: i64) -> Rating {
        Rating {
            user_id: UserId(user),
            book_id: BookId::new(book),
            stars: StarRating::new(stars).unwrap(),
        }
    }

    #[test]
    fn test_window_ratings_skip_dangling_and_undated_books() {
        let catalog = InMemoryCatalog::with_data(
            vec![
                Book::new(BookId::new("dated"), "Dated").with_year(1995),
                Book::new(BookId::new("undated"), "Undated"),
            ],
            vec![
                rating(1, "dated", 4),
                rating(1, "undated", 5),
                rating(1, "missing", 5),
            ],
        );

        let rows = tokio_test::block_on(
            catalog.find_ratings_in_year_window(YearWindow::new(1990, 2000)),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].book_id, BookId::new("dated"));
        assert_eq!(rows[0].publication_year, 1995);
    }

    #[tokio::test]
    async fn test_upsert_rating_replaces_previous_value() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_rating(&rating(7, "b", 2)).await.unwrap();
        catalog.upsert_rating(&rating(7, "b", 5)).await.unwrap();

        let ratings = catalog.find_ratings_by_user(UserId(7)).await.unwrap();
        assert_eq!(ratings, vec![rating(7, "b", 5)]);
    }

    #[tokio::test]
    async fn test_insert_to_read_is_idempotent() {
        let catalog = InMemoryCatalog::new();
        catalog
            .insert_book(Book::new(BookId::new("b"), "Shelved"))
            .await;

        assert!(catalog.insert_to_read(UserId(7), &BookId::new("b")).await.unwrap());
        assert!(!catalog.insert_to_read(UserId(7), &BookId::new("b")).await.unwrap());
        assert!(catalog.insert_to_read(UserId(7), &BookId::new("gone")).await.unwrap());

        let shelf = catalog.find_to_read_by_user(UserId(7)).await.unwrap();
        assert_eq!(shelf.len(), 2);
        assert_eq!(shelf[0].title.as_deref(), Some("Shelved"));
        assert_eq!(shelf[1].title, None);
    }

    #[tokio::test]
    async fn test_list_results_carry_no_genres() {
        let catalog = InMemoryCatalog::new();
        catalog
            .insert_book(Book::new(BookId::new("b"), "Tagged").with_genre("Poetry"))
            .await;

        let by_id = catalog.find_book_by_id(&BookId::new("b")).await.unwrap().unwrap();
        assert_eq!(by_id.genres, vec!["Poetry".to_string()]);

        let listed = catalog
            .find_books_by_facet(&FacetValue::Genre("Poetry".to_string()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].genres.is_empty());
    }

    #[tokio::test]
    async fn test_author_search_ignores_case_and_checks_co_authors() {
        let catalog = InMemoryCatalog::with_data(
            vec![
                Book::new(BookId::new(" 60853980"), "Good Omens")
                    .with_author("Neil Gaiman")
                    .with_author("Terry Pratchett"),
                Book::new(BookId::new(" 380789035"), "American Gods").with_author("Neil Gaiman"),
            ],
            Vec::new(),
        );

        let found = catalog.find_books_by_author_like("pratchett").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Good Omens");
        assert_eq!(found[0].authors.len(), 2);

        let found = catalog.find_books_by_author_like("NEIL").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_author_facet_matches_any_co_author() {
        let catalog = InMemoryCatalog::with_data(
            vec![Book::new(BookId::new(" 60853980"), "Good Omens")
                .with_author("Neil Gaiman")
                .with_author("Terry Pratchett")],
            Vec::new(),
        );

        let listed = catalog
            .find_books_by_facet(&FacetValue::Author("Terry Pratchett".to_string()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}
