use serde::{Deserialize, Serialize};

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult, Missing},
    models::{Book, BookId},
};

/// One pre-curated book offered when the reader would rather pick than type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortlistEntry {
    pub key: &'static str,
    pub label: &'static str,
    /// Stored identifier, leading space included
    pub isbn_10: &'static str,
}

/// Curated seed shortlist
///
/// Identifiers are pinned rather than looked up by title because titles repeat
/// across editions in the catalog.
pub const SHORTLIST: [ShortlistEntry; 5] = [
    ShortlistEntry {
        key: "h",
        label: "The Hobbit and The Lord of the Rings",
        isbn_10: " 345538374",
    },
    ShortlistEntry {
        key: "hp",
        label: "Harry Potter and the Philosopher's Stone",
        isbn_10: " 439554934",
    },
    ShortlistEntry {
        key: "m",
        label: "A Midsummer Night's Dream",
        isbn_10: " 743477545",
    },
    ShortlistEntry {
        key: "g",
        label: "The Giver",
        isbn_10: " 385732554",
    },
    ShortlistEntry {
        key: "t",
        label: "A Tale of Two Cities",
        isbn_10: " 141439602",
    },
];

/// How the reader named the book a recommendation should start from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSelector {
    /// A book identifier typed directly
    Isbn(BookId),
    /// A key from [`SHORTLIST`]
    Shortlist(String),
}

/// Looks up a shortlist key, ignoring case and surrounding whitespace
pub fn shortlist_entry(key: &str) -> Option<&'static ShortlistEntry> {
    let key = key.trim();
    SHORTLIST.iter().find(|e| e.key.eq_ignore_ascii_case(key))
}

/// Resolves a selector to one concrete catalog book
///
/// An unknown shortlist key fails with `Missing::Selection` before the store is
/// touched. A known identifier absent from the catalog fails with
/// `Missing::Book`. Store failures propagate as `StoreUnavailable`.
pub async fn resolve_seed(store: &dyn CatalogStore, selector: &SeedSelector) -> AppResult<Book> {
    let id = match selector {
        SeedSelector::Isbn(id) => id.clone(),
        SeedSelector::Shortlist(key) => {
            let entry = shortlist_entry(key)
                .ok_or_else(|| AppError::NotFound(Missing::Selection(key.clone())))?;
            BookId::new(entry.isbn_10)
        }
    };

    tracing::debug!(isbn_10 = %id, store = store.name(), "Resolving recommendation seed");

    match store.find_book_by_id(&id).await? {
        Some(book) => {
            tracing::info!(isbn_10 = %book.id, title = %book.title, "Seed resolved");
            Ok(book)
        }
        None => {
            tracing::info!(isbn_10 = %id, "Seed not in catalog");
            Err(AppError::NotFound(Missing::Book(id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockCatalogStore;

    fn hobbit() -> Book {
        Book::new(BookId::new(" 345538374"), "The Hobbit").with_year(1937)
    }

    #[test]
    fn test_shortlist_lookup_is_case_insensitive() {
        assert_eq!(shortlist_entry(" HP ").unwrap().isbn_10, " 439554934");
        assert!(shortlist_entry("x").is_none());
    }

    #[tokio::test]
    async fn test_resolve_literal_identifier() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_find_book_by_id()
            .withf(|id| id.as_str() == " 345538374")
            .times(1)
            .returning(|_| Ok(Some(hobbit())));

        let selector = SeedSelector::Isbn(BookId::parse("345538374").unwrap());
        let book = resolve_seed(&store, &selector).await.unwrap();
        assert_eq!(book, hobbit());
    }

    #[tokio::test]
    async fn test_resolve_shortlist_key_uses_pinned_identifier() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_find_book_by_id()
            .withf(|id| id.as_str() == " 345538374")
            .times(1)
            .returning(|_| Ok(Some(hobbit())));

        let book = resolve_seed(&store, &SeedSelector::Shortlist("h".to_string()))
            .await
            .unwrap();
        assert_eq!(book.title, "The Hobbit");
    }

    #[tokio::test]
    async fn test_unknown_shortlist_key_never_queries_store() {
        let mut store = MockCatalogStore::new();
        store.expect_find_book_by_id().never();

        let err = resolve_seed(&store, &SeedSelector::Shortlist("zz".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(Missing::Selection(ref k)) if k == "zz"));
    }

    #[tokio::test]
    async fn test_absent_identifier_is_not_found() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store.expect_find_book_by_id().returning(|_| Ok(None));

        let selector = SeedSelector::Isbn(BookId::new("0000000000"));
        let err = resolve_seed(&store, &selector).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Missing::Book(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_distinct_from_not_found() {
        let mut store = MockCatalogStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_find_book_by_id()
            .returning(|_| Err(AppError::StoreUnavailable(sqlx::Error::PoolTimedOut)));

        let selector = SeedSelector::Isbn(BookId::new("0000000000"));
        let err = resolve_seed(&store, &selector).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
