use std::io::Write;

use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Writes `value` as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// Writes a heading followed by indented lines, or `empty` when there are none
pub fn write_list<W: Write>(
    out: &mut W,
    heading: &str,
    empty: &str,
    lines: impl IntoIterator<Item = String>,
) -> AppResult<()> {
    let lines: Vec<String> = lines.into_iter().collect();
    if lines.is_empty() {
        writeln!(out, "{}", empty)?;
        return Ok(());
    }

    writeln!(out, "{}", heading)?;
    for line in lines {
        writeln!(out, "    {}", line)?;
    }
    Ok(())
}

/// Reports a failed command
///
/// Expected outcomes (`NotFound`, `EmptyWindow`) are written to `out` as a
/// labelled result. Everything else goes to `err`, with a hint when retrying
/// may help.
pub fn report_error<O: Write, E: Write>(
    error: &AppError,
    format: OutputFormat,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<()> {
    match (error, format) {
        (AppError::NotFound(_) | AppError::EmptyWindow { .. }, OutputFormat::Json) => {
            let body = serde_json::json!({
                "outcome": outcome_label(error),
                "message": error.to_string(),
            });
            serde_json::to_writer_pretty(&mut *out, &body).map_err(std::io::Error::from)?;
            writeln!(out)
        }
        (AppError::NotFound(_) | AppError::EmptyWindow { .. }, OutputFormat::Text) => {
            writeln!(out, "{}", error)
        }
        _ if error.is_retryable() => {
            writeln!(err, "Error: {}. Please try again later.", error)
        }
        _ => writeln!(err, "Error: {}", error),
    }
}

fn outcome_label(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound(_) => "not_found",
        AppError::EmptyWindow { .. } => "empty_window",
        AppError::StoreUnavailable(_) => "store_unavailable",
        AppError::InvalidInput(_) => "invalid_input",
        AppError::Output(_) => "output",
    }
}
