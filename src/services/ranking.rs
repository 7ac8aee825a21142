use std::collections::HashMap;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{AverageRating, BookId, Rating, UserId, YearWindow},
};

/// Books listed for a user's top-rated view unless the caller asks otherwise
pub const DEFAULT_TOP_RATED_LIMIT: usize = 10;

/// A user's highest-rated books, best first, at most `limit` of them
///
/// Sorting is stable, so books with equal stars keep the store's order (the
/// MySQL store returns ratings by identifier). Duplicate rows for the same book
/// are kept as-is. A user with no ratings yields an empty list.
pub async fn top_rated_for_user(
    store: &dyn CatalogStore,
    user_id: UserId,
    limit: usize,
) -> AppResult<Vec<Rating>> {
    let mut ratings = store.find_ratings_by_user(user_id).await?;
    let total = ratings.len();

    ratings.sort_by(|a, b| b.stars.cmp(&a.stars));
    ratings.truncate(limit);

    tracing::info!(
        user_id = %user_id,
        total,
        returned = ratings.len(),
        "Top-rated books for user"
    );

    Ok(ratings)
}

/// Mean rating per book for books published strictly inside the window
///
/// Both bounds are excluded. A window with no integer year inside it
/// (including an inverted one) fails with `EmptyWindow` without querying the
/// store; bounds are never swapped.
pub async fn top_rated_in_window(
    store: &dyn CatalogStore,
    window: YearWindow,
) -> AppResult<Vec<AverageRating>> {
    if !window.has_interior() {
        tracing::info!(
            start = window.start,
            end = window.end,
            "Year window has no interior"
        );
        return Err(AppError::EmptyWindow {
            start: window.start,
            end: window.end,
        });
    }

    let rows = store.find_ratings_in_year_window(window).await?;

    // (sum, count) per book, in first-seen order
    let mut order: Vec<BookId> = Vec::new();
    let mut totals: HashMap<BookId, (u64, usize)> = HashMap::new();

    for row in rows.into_iter().filter(|r| window.contains(r.publication_year)) {
        let entry = totals.entry(row.book_id.clone()).or_insert_with(|| {
            order.push(row.book_id.clone());
            (0, 0)
        });
        entry.0 += u64::from(row.stars.value());
        entry.1 += 1;
    }

    let mut averages: Vec<AverageRating> = order
        .into_iter()
        .filter_map(|book_id| {
            let (sum, count) = totals.remove(&book_id)?;
            Some(AverageRating {
                book_id,
                average: sum as f64 / count as f64,
                rating_count: count,
            })
        })
        .collect();

    averages.sort_by(|a, b| b.average.total_cmp(&a.average));

    tracing::info!(
        start = window.start,
        end = window.end,
        books = averages.len(),
        "Top-rated books in window"
    );

    Ok(averages)
}
