use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;

mod output;

mod ask;
mod llm;
mod pipeline;
mod source;
mod summarize;
mod telemetry;

#[derive(Parser)]
#[command(name = "recap", about = "Chunk and recursively summarize long page text with an LLM")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a text splits into chunks at the given budget
    Chunk(pipeline::chunk::ChunkCmd),
    /// Reduce a text to a summary within the budget
    Summarize(summarize::SummarizeCmd),
    /// Summarize a text, then answer a question against it
    Ask(ask::AskCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and RECAP_LOG_FORMAT
    telemetry::config::init_tracing();

    // Ctrl-C stops the reduction before the next summarize call
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Chunk(args) => pipeline::chunk::run(args).await?,
        Commands::Summarize(args) => summarize::run(args, cancel).await?,
        Commands::Ask(args) => ask::run(args, cancel).await?,
    }

    Ok(())
}
