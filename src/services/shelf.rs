use crate::{
    db::{CatalogStore, ShelfStore},
    error::{AppError, AppResult, Missing},
    models::{Book, BookId, Rating, SearchCriteria, StarRating, ToReadEntry, UserId},
};

/// Searches books by genre and language published after a year, newest first
pub async fn search_books(
    store: &dyn CatalogStore,
    criteria: &SearchCriteria,
) -> AppResult<Vec<Book>> {
    let books = store.search_books(criteria).await?;

    tracing::info!(
        genre = %criteria.genre,
        language = %criteria.language_code,
        after = criteria.published_after,
        found = books.len(),
        "Book search"
    );

    Ok(books)
}

/// Records a reader's rating after checking the book exists
///
/// Rating a book that is not in the catalog fails with `NotFound` rather than
/// leaving a dangling row.
pub async fn rate_book<S>(
    store: &S,
    user_id: UserId,
    book_id: &BookId,
    stars: StarRating,
) -> AppResult<Rating>
where
    S: CatalogStore + ShelfStore,
{
    require_book(store, book_id).await?;

    let rating = Rating {
        user_id,
        book_id: book_id.clone(),
        stars,
    };
    store.upsert_rating(&rating).await?;

    tracing::info!(user_id = %user_id, isbn_10 = %book_id, stars = %stars, "Rating recorded");
    Ok(rating)
}

/// Adds a book to a reader's to-read shelf
///
/// Returns `false` when the book was already shelved; that is not an error.
pub async fn add_to_read<S>(store: &S, user_id: UserId, book_id: &BookId) -> AppResult<bool>
where
    S: CatalogStore + ShelfStore,
{
    require_book(store, book_id).await?;

    let added = store.insert_to_read(user_id, book_id).await?;
    if added {
        tracing::info!(user_id = %user_id, isbn_10 = %book_id, "Added to to-read shelf");
    } else {
        tracing::debug!(user_id = %user_id, isbn_10 = %book_id, "Already on to-read shelf");
    }

    Ok(added)
}

/// A reader's to-read shelf, dangling entries included with no title
pub async fn to_read_for_user(
    store: &dyn CatalogStore,
    user_id: UserId,
) -> AppResult<Vec<ToReadEntry>> {
    let shelf = store.find_to_read_by_user(user_id).await?;

    let dangling = shelf.iter().filter(|e| e.title.is_none()).count();
    if dangling > 0 {
        tracing::warn!(user_id = %user_id, dangling, "To-read shelf references missing books");
    }

    Ok(shelf)
}

async fn require_book<S: CatalogStore + ?Sized>(store: &S, book_id: &BookId) -> AppResult<()> {
    match store.find_book_by_id(book_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(Missing::Book(book_id.clone()))),
    }
}
