use std::collections::HashSet;

use serde::Serialize;

use crate::{
    db::CatalogStore,
    models::{Book, BookId, FacetValue, MatchReason, RecommendationCandidate},
};

/// Outcome of one facet's search
#[derive(Debug)]
enum FacetOutcome {
    Found(Vec<Book>),
    Failed,
}

/// Recommendations derived from one seed book
///
/// `candidates` is ordered genre matches, then year matches, then author
/// matches, each group in store order. A book sharing two facets with the seed
/// appears once per facet. `failed` names facets whose search errored and
/// therefore contributed nothing.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Recommendations {
    pub seed: Option<BookId>,
    pub candidates: Vec<RecommendationCandidate>,
    pub failed: Vec<MatchReason>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// True when at least one facet search failed and the list may be partial
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecommendationCandidate> {
        self.candidates.iter()
    }
}

/// Recommends books sharing a genre, publication year or author with the seed
///
/// This is categorical co-membership, not similarity scoring: each facet is an
/// independent set lookup and the only ranking is the fixed facet order. A
/// failed facet search is logged and skipped so the other facets still
/// contribute.
pub async fn recommend(store: &dyn CatalogStore, seed: &Book) -> Recommendations {
    let mut recommendations = Recommendations {
        seed: Some(seed.id.clone()),
        ..Recommendations::default()
    };
    // Per-reason dedup so a seed with several genres or authors lists each
    // sibling once.
    let mut seen: HashSet<(MatchReason, BookId)> = HashSet::new();

    for facet in seed.facets() {
        let reason = facet.reason();

        match search_facet(store, &facet).await {
            FacetOutcome::Found(books) => {
                let before = recommendations.candidates.len();
                for book in books {
                    if book.id == seed.id || !seen.insert((reason, book.id.clone())) {
                        continue;
                    }
                    recommendations.candidates.push(RecommendationCandidate {
                        book_id: book.id,
                        title: book.title,
                        reason,
                    });
                }
                tracing::debug!(
                    facet = %facet,
                    added = recommendations.candidates.len() - before,
                    "Facet search contributed candidates"
                );
            }
            FacetOutcome::Failed => {
                if !recommendations.failed.contains(&reason) {
                    recommendations.failed.push(reason);
                }
            }
        }
    }

    if recommendations.is_partial() {
        tracing::warn!(
            seed = %seed.id,
            failed = ?recommendations.failed,
            candidate_count = recommendations.candidates.len(),
            "Partial recommendation: some facet searches failed"
        );
    } else {
        tracing::info!(
            seed = %seed.id,
            candidate_count = recommendations.candidates.len(),
            "Recommendations derived"
        );
    }

    recommendations
}

async fn search_facet(store: &dyn CatalogStore, facet: &FacetValue) -> FacetOutcome {
    match store.find_books_by_facet(facet).await {
        Ok(books) => FacetOutcome::Found(books),
        Err(e) => {
            tracing::error!(error = %e, facet = %facet, "Facet search failed");
            FacetOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MockCatalogStore, error::AppError};

    fn book(id: &str) -> Book {
        Book::new(BookId::new(id), format!("Title {}", id))
    }

    fn seed() -> Book {
        book("seed")
            .with_genre("Fantasy")
            .with_year(1997)
            .with_author("Rowling")
    }

    fn ids(recommendations: &Recommendations) -> Vec<(&str, MatchReason)> {
        recommendations
            .iter()
            .map(|c| (c.book_id.as_str(), c.reason))
            .collect()
    }

    #[tokio::test]
    async fn test_failed_facet_degrades_without_aborting() {
        let mut store = MockCatalogStore::new();
        store
            .expect_find_books_by_facet()
            .withf(|f| matches!(f, FacetValue::Genre(_)))
            .times(1)
            .returning(|_| Ok(vec![book("g1")]));
        store
            .expect_find_books_by_facet()
            .withf(|f| matches!(f, FacetValue::Year(1997)))
            .times(1)
            .returning(|_| Err(AppError::StoreUnavailable(sqlx::Error::PoolTimedOut)));
        store
            .expect_find_books_by_facet()
            .withf(|f| matches!(f, FacetValue::Author(_)))
            .times(1)
            .returning(|_| Ok(vec![book("a1")]));

        let recommendations = recommend(&store, &seed()).await;

        assert_eq!(
            ids(&recommendations),
            vec![("g1", MatchReason::SameGenre), ("a1", MatchReason::SameAuthor)]
        );
        assert_eq!(recommendations.failed, vec![MatchReason::SameYear]);
        assert!(recommendations.is_partial());
    }

    #[tokio::test]
    async fn test_every_facet_failing_yields_empty_partial_result() {
        let mut store = MockCatalogStore::new();
        store
            .expect_find_books_by_facet()
            .times(3)
            .returning(|_| Err(AppError::StoreUnavailable(sqlx::Error::PoolClosed)));

        let recommendations = recommend(&store, &seed()).await;

        assert!(recommendations.is_empty());
        assert_eq!(
            recommendations.failed,
            vec![
                MatchReason::SameGenre,
                MatchReason::SameYear,
                MatchReason::SameAuthor
            ]
        );
    }

    #[tokio::test]
    async fn test_seed_is_excluded_from_every_facet() {
        let mut store = MockCatalogStore::new();
        store
            .expect_find_books_by_facet()
            .returning(|_| Ok(vec![book("seed"), book("other")]));

        let recommendations = recommend(&store, &seed()).await;

        assert!(recommendations.iter().all(|c| c.book_id.as_str() != "seed"));
        assert_eq!(
            ids(&recommendations),
            vec![
                ("other", MatchReason::SameGenre),
                ("other", MatchReason::SameYear),
                ("other", MatchReason::SameAuthor)
            ]
        );
    }

    #[tokio::test]
    async fn test_multiple_genres_are_merged_once_per_book() {
        let mut store = MockCatalogStore::new();
        store
            .expect_find_books_by_facet()
            .withf(|f| *f == FacetValue::Genre("Fantasy".to_string()))
            .returning(|_| Ok(vec![book("x"), book("y")]));
        store
            .expect_find_books_by_facet()
            .withf(|f| *f == FacetValue::Genre("Classics".to_string()))
            .returning(|_| Ok(vec![book("y"), book("z")]));

        let seed = book("seed").with_genre("Fantasy").with_genre("Classics");
        let recommendations = recommend(&store, &seed).await;

        assert_eq!(
            ids(&recommendations),
            vec![
                ("x", MatchReason::SameGenre),
                ("y", MatchReason::SameGenre),
                ("z", MatchReason::SameGenre)
            ]
        );
    }

    #[tokio::test]
    async fn test_every_co_author_contributes_siblings() {
        let mut store = MockCatalogStore::new();
        store
            .expect_find_books_by_facet()
            .withf(|f| *f == FacetValue::Author("Neil Gaiman".to_string()))
            .times(1)
            .returning(|_| Ok(vec![book("seed"), book("gaiman-1"), book("both")]));
        store
            .expect_find_books_by_facet()
            .withf(|f| *f == FacetValue::Author("Terry Pratchett".to_string()))
            .times(1)
            .returning(|_| Ok(vec![book("both"), book("pratchett-1"), book("seed")]));

        let seed = book("seed")
            .with_author("Neil Gaiman")
            .with_author("Terry Pratchett");
        let recommendations = recommend(&store, &seed).await;

        assert_eq!(
            ids(&recommendations),
            vec![
                ("gaiman-1", MatchReason::SameAuthor),
                ("both", MatchReason::SameAuthor),
                ("pratchett-1", MatchReason::SameAuthor)
            ]
        );
    }

    #[tokio::test]
    async fn test_seed_without_facets_issues_no_queries() {
        let mut store = MockCatalogStore::new();
        store.expect_find_books_by_facet().never();

        let recommendations = recommend(&store, &book("bare")).await;

        assert!(recommendations.is_empty());
        assert!(!recommendations.is_partial());
    }
}
