use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use catecismo_search::api;
use catecismo_search::config::Config;
use catecismo_search::shell;
use catecismo_search::state::AppState;

#[derive(Parser)]
#[command(name = "catecismo-search", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web interface and JSON API (default)
    Serve,
    /// Search interactively from the terminal
    Shell {
        /// Paragraph number or permalink to open on start
        #[arg(long, short)]
        paragraph: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the shell's stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    tracing::info!(
        "LLM provider: {} ({}), remote search {}",
        config.llm.provider,
        config.llm.model,
        if config.llm.enabled { "enabled" } else { "disabled" }
    );

    let state = AppState::new(config.clone())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = api::router(state);
            let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
            tracing::info!("Server listening on {}", config.bind_addr);
            axum::serve(listener, app).await?;
        }
        Command::Shell { paragraph } => shell::run(state, paragraph).await?,
    }
    Ok(())
}
