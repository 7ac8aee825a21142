use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::Instrument;

use booksdb::{
    cli::{self, Cli, OutputFormat, Settings},
    config::Config,
    db::{create_pool, MySqlCatalog},
    telemetry::{self, InvocationId},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let args = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = &args.database_url {
        config.database_url = url.clone();
    }

    // Connect lazily; an unreachable database is reported per command
    let pool = create_pool(&config).context("Failed to configure database pool")?;
    let store = MySqlCatalog::new(pool.clone());

    let settings = Settings {
        format: OutputFormat::from_flag(args.json),
        top_rated_limit: config.top_rated_limit,
    };

    let span = telemetry::invocation_span(InvocationId::new(), args.command.name());
    let mut stdout = std::io::stdout().lock();
    let result = cli::execute(&args.command, &store, &settings, &mut stdout)
        .instrument(span)
        .await;

    pool.close().await;

    if let Err(e) = result {
        tracing::debug!(error = %e, retryable = e.is_retryable(), "Command failed");
        cli::report_error(&e, settings.format, &mut stdout, &mut std::io::stderr())?;
        let code = e.exit_code();
        if code != 0 {
            stdout.flush()?;
            std::process::exit(code);
        }
    }

    Ok(())
}
