pub mod ranking;
pub mod recommendations;
pub mod seed;
pub mod series;
pub mod shelf;

pub use ranking::{top_rated_for_user, top_rated_in_window, DEFAULT_TOP_RATED_LIMIT};
pub use recommendations::{recommend, Recommendations};
pub use seed::{resolve_seed, SeedSelector, SHORTLIST};
pub use series::{books_by_series_author, popular_series, POPULAR_SERIES};
pub use shelf::{add_to_read, rate_book, search_books, to_read_for_user};
