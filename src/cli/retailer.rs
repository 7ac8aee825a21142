use std::io::Write;

use super::{
    output::{write_json, write_list},
    OutputFormat, RetailerCommand, Settings,
};
use crate::{
    db::CatalogStore,
    error::AppResult,
    models::YearWindow,
    services,
};

pub async fn execute<S, W>(
    command: &RetailerCommand,
    store: &S,
    settings: &Settings,
    out: &mut W,
) -> AppResult<()>
where
    S: CatalogStore,
    W: Write,
{
    let format = settings.format;

    match command {
        RetailerCommand::TopRated(args) => {
            let limit = args.limit.unwrap_or(settings.top_rated_limit);
            let ratings = services::top_rated_for_user(store, args.user, limit).await?;

            if format == OutputFormat::Json {
                return write_json(out, &ratings);
            }
            write_list(
                out,
                &format!("User {}'s top rated books:", args.user),
                &format!("User {} has not rated any books.", args.user),
                ratings
                    .iter()
                    .map(|r| format!("{} {}", r.book_id.as_str().trim(), r.stars)),
            )
        }
        RetailerCommand::Timeframe(args) => {
            let window = YearWindow::new(args.start, args.end);
            let averages = services::top_rated_in_window(store, window).await?;

            if format == OutputFormat::Json {
                return write_json(out, &averages);
            }
            write_list(
                out,
                &format!(
                    "Top rated books published after {} and before {}:",
                    window.start, window.end
                ),
                &format!(
                    "No rated books were published after {} and before {}.",
                    window.start, window.end
                ),
                averages.iter().map(|a| {
                    format!(
                        "{} {:.2} ({} ratings)",
                        a.book_id.as_str().trim(),
                        a.average,
                        a.rating_count
                    )
                }),
            )
        }
        RetailerCommand::ToRead(args) => {
            let shelf = services::to_read_for_user(store, args.user).await?;

            if format == OutputFormat::Json {
                return write_json(out, &shelf);
            }
            write_list(
                out,
                &format!("User {}'s to-read shelf:", args.user),
                &format!("User {} has no books on their to-read shelf.", args.user),
                shelf.iter().map(|e| {
                    format!(
                        "{} {}",
                        e.book_id.as_str().trim(),
                        e.title.as_deref().unwrap_or("(not in catalog)")
                    )
                }),
            )
        }
    }
}
