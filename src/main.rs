use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use paperdesk::{
    browser::{Outcome, PaperBrowser},
    cli::{Cli, Commands},
    client::{PaperClient, PaperSource},
    config::Config,
    models::SearchFilter,
    tui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "paperdesk=info");
    }

    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    init_logging(interactive);

    let config = Config::from_env()?.with_base_url(cli.base_url.as_deref());

    match cli.command {
        None | Some(Commands::Tui) => {
            config.validate()?;
            info!("Launching TUI interface");

            match tui::run_tui(config).await {
                Ok(_) => info!("TUI exited successfully"),
                Err(e) => {
                    error!("TUI failed: {}", e);
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Some(Commands::List) => {
            let mut browser = browser_for(&config)?;
            let outcome = browser.initial_load().await;
            println!("{}", browser.panel().to_text());
            exit_on_failure(&outcome);
        }

        Some(Commands::Search { filter }) => {
            let filter = SearchFilter::from(filter);
            info!("Search criteria: {:?}", filter);

            let mut browser = browser_for(&config)?;
            let outcome = browser.search(&filter).await;
            println!("{}", browser.panel().to_text());
            exit_on_failure(&outcome);
        }

        Some(Commands::Download { name, filter, output }) => {
            let config = config.with_download_dir(output.as_deref());
            config.validate()?;

            let client = PaperClient::new(&config)?;
            let response = client
                .search_papers(&SearchFilter::from(filter))
                .await
                .context("Search failed")?;

            let wanted = name.to_lowercase();
            let record = response
                .data
                .unwrap_or_default()
                .into_iter()
                .find(|p| p.name.to_lowercase() == wanted);

            match record {
                Some(record) => {
                    let path = client
                        .download(&record, Path::new(config.download_dir_str()))
                        .await
                        .with_context(|| format!("Download of '{}' failed", record.name))?;
                    println!("Saved {}", path.display());
                }
                None => {
                    eprintln!("No paper named '{}' matches the given filters", name);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Console + file logging for one-shot commands; file only for the TUI
fn init_logging(interactive: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", "paperdesk.log");

    let console = if interactive {
        None
    } else {
        Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
    };

    tracing_subscriber::registry()
        .with(console)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

fn browser_for(config: &Config) -> Result<PaperBrowser> {
    let client = PaperClient::new(config)?;
    Ok(PaperBrowser::new(Arc::new(client)))
}

fn exit_on_failure(outcome: &Outcome) {
    if let Outcome::Failed(e) = outcome {
        error!("Request failed: {}", e);
        std::process::exit(1);
    }
}
