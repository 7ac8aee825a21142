//! MySQL-backed catalog store
//!
//! All values travel as bind parameters. Numeric columns are cast to `SIGNED`
//! in SQL so they decode as `i64` whatever integer width the schema uses.
use std::{collections::HashMap, time::Duration};

use sqlx::{
    mysql::{MySqlPool, MySqlPoolOptions},
    FromRow,
};

use crate::{
    config::Config,
    db::{CatalogStore, ShelfStore},
    error::AppResult,
    models::{
        Book, BookId, FacetValue, Rating, SearchCriteria, StarRating, ToReadEntry, UserId,
        WindowRating, YearWindow,
    },
};

/// Creates a MySQL connection pool
///
/// Connections are established lazily, so a database that is down surfaces as
/// `StoreUnavailable` on the first query instead of aborting startup.
pub fn create_pool(config: &Config) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(&config.database_url)?;

    Ok(pool)
}

const BOOK_SELECT: &str = r#"
    SELECT b.isbn_10,
           b.orig_title,
           CAST(b.orig_publication_yr AS SIGNED) AS publication_year,
           b.language_code,
           CAST(d.num_pages AS SIGNED) AS num_pages,
           CAST(d.num_comments AS SIGNED) AS num_comments,
           CAST(d.num_editions AS SIGNED) AS num_editions
    FROM books b
    LEFT JOIN book_details d ON d.isbn_10 = b.isbn_10
"#;

#[derive(Debug, FromRow)]
struct BookRow {
    isbn_10: String,
    orig_title: Option<String>,
    publication_year: Option<i64>,
    language_code: Option<String>,
    num_pages: Option<i64>,
    num_comments: Option<i64>,
    num_editions: Option<i64>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: BookId::new(row.isbn_10),
            title: row.orig_title.unwrap_or_default(),
            publication_year: row.publication_year.and_then(|y| i32::try_from(y).ok()),
            language_code: row.language_code,
            authors: Vec::new(),
            num_pages: row.num_pages,
            num_comments: row.num_comments,
            num_editions: row.num_editions,
            genres: Vec::new(),
        }
    }
}

#[derive(Debug, FromRow)]
struct AuthorRow {
    isbn_10: String,
    author: String,
}

#[derive(Debug, FromRow)]
struct RatingRow {
    user_id: i64,
    isbn_10: String,
    rating: i64,
}

#[derive(Debug, FromRow)]
struct WindowRatingRow {
    isbn_10: String,
    rating: i64,
    publication_year: i64,
}

#[derive(Debug, FromRow)]
struct ToReadRow {
    user_id: i64,
    isbn_10: String,
    orig_title: Option<String>,
}

/// Drops rating rows whose star value is outside 1–5
fn checked_stars(isbn_10: &str, rating: i64) -> Option<StarRating> {
    match StarRating::new(rating) {
        Ok(stars) => Some(stars),
        Err(_) => {
            tracing::warn!(
                isbn_10 = %isbn_10,
                rating,
                "Skipping rating row with out-of-range value"
            );
            None
        }
    }
}

fn group_authors(rows: Vec<AuthorRow>) -> HashMap<BookId, Vec<String>> {
    let mut by_book: HashMap<BookId, Vec<String>> = HashMap::new();
    for row in rows {
        let author = row.author.trim();
        if author.is_empty() {
            continue;
        }
        let authors = by_book.entry(BookId::new(row.isbn_10)).or_default();
        if !authors.iter().any(|a| a == author) {
            authors.push(author.to_string());
        }
    }
    by_book
}

/// Escapes `%`, `_` and `\` so the fragment matches literally inside `LIKE`
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Clone)]
pub struct MySqlCatalog {
    pool: MySqlPool,
}

impl MySqlCatalog {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_books(&self, sql: &str, binds: Vec<BindValue<'_>>) -> AppResult<Vec<Book>> {
        let mut query = sqlx::query_as::<_, BookRow>(sql);
        for bind in binds {
            query = match bind {
                BindValue::Text(text) => query.bind(text),
                BindValue::Owned(text) => query.bind(text),
                BindValue::Int(value) => query.bind(value),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut books: Vec<Book> = rows.into_iter().map(Book::from).collect();
        self.attach_authors(&mut books).await?;
        Ok(books)
    }

    /// Fills in every author of each book with a single query
    async fn attach_authors(&self, books: &mut [Book]) -> AppResult<()> {
        if books.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; books.len()].join(", ");
        let sql = format!(
            "SELECT isbn_10, author FROM authors WHERE isbn_10 IN ({}) ORDER BY isbn_10, author",
            placeholders
        );

        let mut query = sqlx::query_as::<_, AuthorRow>(&sql);
        for book in books.iter() {
            query = query.bind(book.id.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_book = group_authors(rows);
        for book in books.iter_mut() {
            book.authors = by_book.remove(&book.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn fetch_genres(&self, id: &BookId) -> AppResult<Vec<String>> {
        let genres: Vec<(String,)> =
            sqlx::query_as("SELECT genre FROM genres WHERE isbn_10 = ? ORDER BY genre")
                .bind(id.as_str())
                .fetch_all(&self.pool)
                .await?;

        Ok(genres.into_iter().map(|(genre,)| genre).collect())
    }
}

enum BindValue<'a> {
    Text(&'a str),
    Owned(String),
    Int(i32),
}

#[async_trait::async_trait]
impl CatalogStore for MySqlCatalog {
    async fn find_book_by_id(&self, id: &BookId) -> AppResult<Option<Book>> {
        let sql = format!("{} WHERE b.isbn_10 = ?", BOOK_SELECT);
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut book = Book::from(row);
        self.attach_authors(std::slice::from_mut(&mut book)).await?;
        book.genres = self.fetch_genres(id).await?;
        Ok(Some(book))
    }

    async fn find_books_by_facet(&self, facet: &FacetValue) -> AppResult<Vec<Book>> {
        let (filter, bind) = match facet {
            FacetValue::Genre(genre) => (
                "EXISTS (SELECT 1 FROM genres g WHERE g.isbn_10 = b.isbn_10 AND g.genre = ?)",
                BindValue::Text(genre.as_str()),
            ),
            FacetValue::Year(year) => ("b.orig_publication_yr = ?", BindValue::Int(*year)),
            FacetValue::Author(author) => (
                "EXISTS (SELECT 1 FROM authors a WHERE a.isbn_10 = b.isbn_10 AND a.author = ?)",
                BindValue::Text(author.as_str()),
            ),
        };

        let sql = format!("{} WHERE {} ORDER BY b.isbn_10", BOOK_SELECT, filter);
        self.fetch_books(&sql, vec![bind]).await
    }

    async fn find_ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let rows = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT CAST(user_id AS SIGNED) AS user_id,
                   isbn_10,
                   CAST(rating AS SIGNED) AS rating
            FROM ratings
            WHERE user_id = ?
            ORDER BY isbn_10
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let stars = checked_stars(&row.isbn_10, row.rating)?;
                Some(Rating {
                    user_id: UserId(row.user_id),
                    book_id: BookId::new(row.isbn_10),
                    stars,
                })
            })
            .collect())
    }

    async fn find_ratings_in_year_window(
        &self,
        window: YearWindow,
    ) -> AppResult<Vec<WindowRating>> {
        let rows = sqlx::query_as::<_, WindowRatingRow>(
            r#"
            SELECT r.isbn_10,
                   CAST(r.rating AS SIGNED) AS rating,
                   CAST(b.orig_publication_yr AS SIGNED) AS publication_year
            FROM ratings r
            JOIN books b ON b.isbn_10 = r.isbn_10
            WHERE b.orig_publication_yr > ? AND b.orig_publication_yr < ?
            ORDER BY r.isbn_10
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let stars = checked_stars(&row.isbn_10, row.rating)?;
                let publication_year = i32::try_from(row.publication_year).ok()?;
                Some(WindowRating {
                    book_id: BookId::new(row.isbn_10),
                    stars,
                    publication_year,
                })
            })
            .collect())
    }

    async fn search_books(&self, criteria: &SearchCriteria) -> AppResult<Vec<Book>> {
        let sql = format!(
            "{} WHERE EXISTS (SELECT 1 FROM genres g WHERE g.isbn_10 = b.isbn_10 AND g.genre = ?) \
             AND b.language_code = ? AND b.orig_publication_yr > ? \
             ORDER BY b.orig_publication_yr DESC, b.isbn_10",
            BOOK_SELECT
        );

        self.fetch_books(
            &sql,
            vec![
                BindValue::Text(criteria.genre.as_str()),
                BindValue::Text(criteria.language_code.as_str()),
                BindValue::Int(criteria.published_after),
            ],
        )
        .await
    }

    async fn find_books_by_author_like(&self, fragment: &str) -> AppResult<Vec<Book>> {
        let sql = format!(
            "{} WHERE EXISTS (SELECT 1 FROM authors a \
             WHERE a.isbn_10 = b.isbn_10 AND a.author LIKE ?) \
             ORDER BY b.orig_publication_yr, b.isbn_10",
            BOOK_SELECT
        );

        self.fetch_books(&sql, vec![BindValue::Owned(like_pattern(fragment))])
            .await
    }

    async fn find_to_read_by_user(&self, user_id: UserId) -> AppResult<Vec<ToReadEntry>> {
        let rows = sqlx::query_as::<_, ToReadRow>(
            r#"
            SELECT CAST(t.user_id AS SIGNED) AS user_id,
                   t.isbn_10,
                   b.orig_title
            FROM to_read t
            LEFT JOIN books b ON b.isbn_10 = t.isbn_10
            WHERE t.user_id = ?
            ORDER BY t.isbn_10
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ToReadEntry {
                user_id: UserId(row.user_id),
                book_id: BookId::new(row.isbn_10),
                title: row.orig_title,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mysql"
    }
}

#[async_trait::async_trait]
impl ShelfStore for MySqlCatalog {
    async fn upsert_rating(&self, rating: &Rating) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ratings (user_id, isbn_10, rating)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE rating = VALUES(rating)
            "#,
        )
        .bind(rating.user_id.0)
        .bind(rating.book_id.as_str())
        .bind(i64::from(rating.stars))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_to_read(&self, user_id: UserId, book_id: &BookId) -> AppResult<bool> {
        // Guarded insert keeps the shelf idempotent even without a unique key.
        let result = sqlx::query(
            r#"
            INSERT INTO to_read (user_id, isbn_10)
            SELECT ?, ? FROM DUAL
            WHERE NOT EXISTS (
                SELECT 1 FROM to_read WHERE user_id = ? AND isbn_10 = ?
            )
            "#,
        )
        .bind(user_id.0)
        .bind(book_id.as_str())
        .bind(user_id.0)
        .bind(book_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Rowling"), "%Rowling%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_book_row_conversion() {
        let row = BookRow {
            isbn_10: " 439554934".to_string(),
            orig_title: Some("Harry Potter and the Philosopher's Stone".to_string()),
            publication_year: Some(1997),
            language_code: Some("eng".to_string()),
            num_pages: Some(320),
            num_comments: None,
            num_editions: Some(491),
        };

        let book = Book::from(row);
        assert_eq!(book.id, BookId::new(" 439554934"));
        assert_eq!(book.publication_year, Some(1997));
        assert!(book.authors.is_empty());
        assert!(book.genres.is_empty());
    }

    #[test]
    fn test_book_row_conversion_drops_unrepresentable_year() {
        let row = BookRow {
            isbn_10: "1".to_string(),
            orig_title: None,
            publication_year: Some(i64::MAX),
            language_code: None,
            num_pages: None,
            num_comments: None,
            num_editions: None,
        };

        let book = Book::from(row);
        assert_eq!(book.title, "");
        assert_eq!(book.publication_year, None);
    }

    #[test]
    fn test_group_authors_keeps_every_co_author() {
        let row = |isbn: &str, author: &str| AuthorRow {
            isbn_10: isbn.to_string(),
            author: author.to_string(),
        };

        let grouped = group_authors(vec![
            row(" 60853980", "Neil Gaiman"),
            row(" 60853980", "Terry Pratchett"),
            row(" 60853980", "Terry Pratchett"),
            row(" 439554934", " "),
            row("1416524797", "Stephen King"),
        ]);

        assert_eq!(
            grouped[&BookId::new(" 60853980")],
            vec!["Neil Gaiman".to_string(), "Terry Pratchett".to_string()]
        );
        assert!(!grouped.contains_key(&BookId::new(" 439554934")));
        assert_eq!(grouped[&BookId::new("1416524797")], vec!["Stephen King".to_string()]);
    }

    #[test]
    fn test_checked_stars_skips_out_of_range() {
        assert_eq!(checked_stars("1", 4), Some(StarRating::new(4).unwrap()));
        assert_eq!(checked_stars("1", 0), None);
        assert_eq!(checked_stars("1", 11), None);
    }

    #[tokio::test]
    async fn test_create_pool_is_lazy() {
        let config = Config {
            database_url: "mysql://nobody@127.0.0.1:1/booksdb".to_string(),
            ..Config::default()
        };

        let pool = create_pool(&config).unwrap();
        assert_eq!(pool.size(), 0);
    }
}
