mod api;
mod app;
mod attachment;
mod categories;
mod config;
mod error;
mod header;
mod history;
mod languages;
mod locale;
mod open_url;
mod stories;
mod tracking;
mod ui;
mod util;

use anyhow::Result;
use clap::Parser;
use console::Term;
use std::path::PathBuf;

/// Browse a press newsroom from the terminal
#[derive(Parser, Debug)]
#[command(name = "newsroom-cli", version, about)]
struct Cli {
    /// Path to a config.toml (defaults to ~/.config/newsroom-cli/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content locale, e.g. `en` or `nl_BE`
    #[arg(short, long)]
    locale: Option<String>,

    /// Start in the category with this slug
    #[arg(long)]
    category: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let cfg = config::load(config::Overrides {
        config_path: cli.config,
        locale: cli.locale,
    })?;

    // Clear terminal at startup for a clean UI
    let _ = Term::stdout().clear_screen();
    app::run(&cfg, cli.category.as_deref()).await
}
