use std::io::Write;

use serde_json::json;

use super::{
    output::{write_json, write_list},
    OutputFormat, ReaderCommand, RecommendArgs, Settings,
};
use crate::{
    db::{CatalogStore, ShelfStore},
    error::AppResult,
    models::{Book, SearchCriteria},
    services::{self, POPULAR_SERIES, SHORTLIST},
};

pub async fn execute<S, W>(
    command: &ReaderCommand,
    store: &S,
    settings: &Settings,
    out: &mut W,
) -> AppResult<()>
where
    S: CatalogStore + ShelfStore,
    W: Write,
{
    let format = settings.format;

    match command {
        ReaderCommand::Search(args) => {
            let criteria = SearchCriteria {
                genre: args.genre.clone(),
                language_code: args.language.clone(),
                published_after: args.after,
            };
            let books = services::search_books(store, &criteria).await?;

            if format == OutputFormat::Json {
                return write_json(out, &books);
            }
            write_list(
                out,
                &format!(
                    "Books under genre {}, in {}, published after {}:",
                    criteria.genre, criteria.language_code, criteria.published_after
                ),
                &format!(
                    "Could not find any books under genre {}, in {}, published after {}.",
                    criteria.genre, criteria.language_code, criteria.published_after
                ),
                books.iter().map(|b| format!("{} {}", b.title, year_text(b))),
            )
        }
        ReaderCommand::Rate(args) => {
            let rating = services::rate_book(store, args.user, &args.isbn, args.stars).await?;

            if format == OutputFormat::Json {
                return write_json(out, &rating);
            }
            writeln!(
                out,
                "Recorded {} stars from user {} for '{}'.",
                rating.stars,
                rating.user_id,
                rating.book_id.as_str().trim()
            )?;
            Ok(())
        }
        ReaderCommand::ToRead(args) => {
            let added = services::add_to_read(store, args.user, &args.isbn).await?;

            if format == OutputFormat::Json {
                return write_json(
                    out,
                    &json!({ "user_id": args.user, "book_id": args.isbn, "added": added }),
                );
            }
            if added {
                writeln!(out, "Added '{}' to your to-read shelf.", args.isbn.as_str().trim())?;
            } else {
                writeln!(out, "'{}' is already on your to-read shelf.", args.isbn.as_str().trim())?;
            }
            Ok(())
        }
        ReaderCommand::Series(args) => {
            let Some(key) = &args.key else {
                if format == OutputFormat::Json {
                    return write_json(out, &POPULAR_SERIES);
                }
                return write_list(
                    out,
                    "Popular series:",
                    "No popular series configured.",
                    POPULAR_SERIES
                        .iter()
                        .map(|s| format!("({}) - {} by {}", s.key, s.series, s.author)),
                );
            };

            let series = services::popular_series(key)?;
            let books = services::books_by_series_author(store, series).await?;

            if format == OutputFormat::Json {
                return write_json(out, &books);
            }
            write_list(
                out,
                &format!("Books by {} ({}):", series.author, series.series),
                &format!("Could not find any books by {}.", series.author),
                books.iter().map(series_line),
            )
        }
        ReaderCommand::Shortlist => {
            if format == OutputFormat::Json {
                let entries: Vec<_> = SHORTLIST
                    .iter()
                    .map(|e| json!({ "key": e.key, "label": e.label, "isbn_10": e.isbn_10 }))
                    .collect();
                return write_json(out, &entries);
            }
            write_list(
                out,
                "Which of these books appeals to you most?",
                "No books on the shortlist.",
                SHORTLIST.iter().map(|e| format!("({}) - {}", e.key, e.label)),
            )
        }
        ReaderCommand::Recommend(args) => recommend(args, store, format, out).await,
    }
}

async fn recommend<S, W>(
    args: &RecommendArgs,
    store: &S,
    format: OutputFormat,
    out: &mut W,
) -> AppResult<()>
where
    S: CatalogStore,
    W: Write,
{
    let seed = services::resolve_seed(store, &args.selector()).await?;
    let recommendations = services::recommend(store, &seed).await;

    if format == OutputFormat::Json {
        return write_json(out, &recommendations);
    }

    write_list(
        out,
        &format!("Here are some recommendations based on '{}':", seed.title),
        "There are no books with the same genre, publication year, or author as the selection.",
        recommendations.iter().map(|c| {
            format!("{} {} ({})", c.book_id.as_str().trim(), c.title, c.reason)
        }),
    )?;

    if recommendations.is_partial() {
        let failed: Vec<String> = recommendations
            .failed
            .iter()
            .map(|r| r.to_string())
            .collect();
        writeln!(
            out,
            "Note: some matches could not be looked up ({}); the list may be incomplete.",
            failed.join(", ")
        )?;
    }

    Ok(())
}

fn year_text(book: &Book) -> String {
    book.publication_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "unknown year".to_string())
}

fn series_line(book: &Book) -> String {
    let count = |value: Option<i64>| {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!(
        "{} {} {} pages={} comments={} editions={}",
        book.title,
        year_text(book),
        book.author_names()
            .unwrap_or_else(|| "unknown author".to_string()),
        count(book.num_pages),
        count(book.num_comments),
        count(book.num_editions)
    )
}
