use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::{
    db::{CatalogStore, ShelfStore},
    error::AppResult,
    models::{BookId, StarRating, UserId},
    services::SeedSelector,
};

pub mod output;
pub mod reader;
pub mod retailer;

pub use output::{report_error, OutputFormat};

/// Command-line arguments for booksdb
#[derive(Parser, Debug)]
#[command(name = "booksdb")]
#[command(about = "Search, rate and get recommendations from the books database")]
#[command(version)]
pub struct Cli {
    /// MySQL connection URL; overrides DATABASE_URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reader operations
    #[command(subcommand)]
    Reader(ReaderCommand),

    /// Retailer (admin) operations
    #[command(subcommand)]
    Retailer(RetailerCommand),
}

impl Command {
    /// Short name used in the invocation span
    pub fn name(&self) -> &'static str {
        match self {
            Command::Reader(ReaderCommand::Search(_)) => "reader.search",
            Command::Reader(ReaderCommand::Rate(_)) => "reader.rate",
            Command::Reader(ReaderCommand::ToRead(_)) => "reader.to_read",
            Command::Reader(ReaderCommand::Series(_)) => "reader.series",
            Command::Reader(ReaderCommand::Shortlist) => "reader.shortlist",
            Command::Reader(ReaderCommand::Recommend(_)) => "reader.recommend",
            Command::Retailer(RetailerCommand::TopRated(_)) => "retailer.top_rated",
            Command::Retailer(RetailerCommand::Timeframe(_)) => "retailer.timeframe",
            Command::Retailer(RetailerCommand::ToRead(_)) => "retailer.to_read",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ReaderCommand {
    /// Search books by genre and language published after a year
    Search(SearchArgs),
    /// Rate a book from 1 to 5 stars
    Rate(RateArgs),
    /// Add a book to your to-read shelf
    ToRead(ShelveArgs),
    /// List books by the author of a popular series
    Series(SeriesArgs),
    /// Show the curated books you can pick a recommendation seed from
    Shortlist,
    /// Recommend books similar to one you enjoyed
    Recommend(RecommendArgs),
}

#[derive(Subcommand, Debug)]
pub enum RetailerCommand {
    /// A user's top-rated books
    TopRated(TopRatedArgs),
    /// Top-rated books published strictly between two years
    Timeframe(TimeframeArgs),
    /// A user's to-read shelf
    ToRead(UserArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(long)]
    pub genre: String,
    /// Language code, e.g. eng
    #[arg(long)]
    pub language: String,
    /// Only books published after this year
    #[arg(long, allow_negative_numbers = true)]
    pub after: i32,
}

#[derive(Args, Debug)]
pub struct RateArgs {
    #[arg(long)]
    pub user: UserId,
    #[arg(long)]
    pub isbn: BookId,
    #[arg(long)]
    pub stars: StarRating,
}

#[derive(Args, Debug)]
pub struct ShelveArgs {
    #[arg(long)]
    pub user: UserId,
    #[arg(long)]
    pub isbn: BookId,
}

#[derive(Args, Debug)]
pub struct SeriesArgs {
    /// Series key (h, t, g, n, got); omit to list the series
    pub key: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("seed").required(true).args(["isbn", "pick"])))]
pub struct RecommendArgs {
    /// isbn_10 of a book you enjoyed
    #[arg(long)]
    pub isbn: Option<BookId>,
    /// Key of a book from the shortlist
    #[arg(long)]
    pub pick: Option<String>,
}

impl RecommendArgs {
    pub fn selector(&self) -> SeedSelector {
        match (&self.isbn, &self.pick) {
            (Some(isbn), _) => SeedSelector::Isbn(isbn.clone()),
            (None, Some(key)) => SeedSelector::Shortlist(key.clone()),
            (None, None) => unreachable!("the seed group requires --isbn or --pick"),
        }
    }
}

#[derive(Args, Debug)]
pub struct TopRatedArgs {
    #[arg(long)]
    pub user: UserId,
    /// Number of books to show; defaults to TOP_RATED_LIMIT
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct TimeframeArgs {
    /// Lower bound, excluded
    #[arg(long, allow_negative_numbers = true)]
    pub start: i32,
    /// Upper bound, excluded
    #[arg(long, allow_negative_numbers = true)]
    pub end: i32,
}

#[derive(Args, Debug)]
pub struct UserArgs {
    #[arg(long)]
    pub user: UserId,
}

/// Settings a command needs beyond its own arguments
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub format: OutputFormat,
    pub top_rated_limit: usize,
}

/// Runs one parsed command against the store, writing results to `out`
pub async fn execute<S, W>(
    command: &Command,
    store: &S,
    settings: &Settings,
    out: &mut W,
) -> AppResult<()>
where
    S: CatalogStore + ShelfStore,
    W: std::io::Write,
{
    match command {
        Command::Reader(cmd) => reader::execute(cmd, store, settings, out).await,
        Command::Retailer(cmd) => retailer::execute(cmd, store, settings, out).await,
    }
}
