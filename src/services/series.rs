use serde::Serialize;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult, Missing},
    models::Book,
};

/// A popular series and the author name fragment its books are filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopularSeries {
    pub key: &'static str,
    pub series: &'static str,
    pub author: &'static str,
}

pub const POPULAR_SERIES: [PopularSeries; 5] = [
    PopularSeries {
        key: "h",
        series: "Harry Potter",
        author: "J.K. Rowling",
    },
    PopularSeries {
        key: "t",
        series: "Twilight",
        author: "Stephenie Meyer",
    },
    PopularSeries {
        key: "g",
        series: "The Hunger Games",
        author: "Suzanne Collins",
    },
    PopularSeries {
        key: "n",
        series: "The Chronicles of Narnia",
        author: "C.S. Lewis",
    },
    PopularSeries {
        key: "got",
        series: "A Game of Thrones",
        author: "George R.R. Martin",
    },
];

/// Finds a popular series by menu key, ignoring case and surrounding whitespace
pub fn popular_series(key: &str) -> AppResult<&'static PopularSeries> {
    let key = key.trim();
    POPULAR_SERIES
        .iter()
        .find(|s| s.key.eq_ignore_ascii_case(key))
        .ok_or_else(|| AppError::NotFound(Missing::Series(key.to_string())))
}

/// Every book filed under the series author, matched by name substring
pub async fn books_by_series_author(
    store: &dyn CatalogStore,
    series: &PopularSeries,
) -> AppResult<Vec<Book>> {
    let books = store.find_books_by_author_like(series.author).await?;

    tracing::info!(
        series = series.series,
        author = series.author,
        found = books.len(),
        "Books by popular series author"
    );

    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::InMemoryCatalog, models::BookId};

    #[test]
    fn test_popular_series_lookup() {
        assert_eq!(popular_series("GOT").unwrap().author, "George R.R. Martin");
        assert!(matches!(
            popular_series("lotr"),
            Err(AppError::NotFound(Missing::Series(ref k))) if k == "lotr"
        ));
    }

    #[tokio::test]
    async fn test_books_by_series_author_matches_substring() {
        let store = InMemoryCatalog::with_data(
            vec![
                Book::new(BookId::new(" 439554934"), "Harry Potter and the Philosopher's Stone")
                    .with_author("J.K. Rowling")
                    .with_author("Mary GrandPré"),
                Book::new(BookId::new(" 316015849"), "Twilight").with_author("Stephenie Meyer"),
            ],
            Vec::new(),
        );

        let series = popular_series("h").unwrap();
        let books = books_by_series_author(&store, series).await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, BookId::new(" 439554934"));
    }
}
