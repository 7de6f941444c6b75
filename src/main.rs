use clap::Parser as ClapParser;
use dql_lang::cli::{self, CliError, RunOptions};
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "dql")]
#[command(about = "DQL - A query language for markdown notes")]
#[command(version)]
struct Cli {
    /// The DQL query to execute (reads from stdin if not provided)
    #[arg(short, long)]
    query: Option<String>,

    /// Print the lexed tokens as JSON to stderr
    #[arg(long)]
    ast: bool,

    /// Print the metadata of every loaded document as JSON to stderr
    #[arg(long)]
    metadata: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("DQL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Cli::parse();

    if let Err(e) = run(args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<(), CliError> {
    let piped = !atty::is(atty::Stream::Stdin);
    let query = cli::resolve_query(args.query, piped, io::stdin())?;

    let options = RunOptions {
        query,
        show_tokens: args.ast,
        show_metadata: args.metadata,
    };

    let result = cli::run_query(&options)?;

    if let Some(tokens) = &result.tokens {
        eprintln!("{}", serde_json::to_string_pretty(tokens)?);
    }
    if let Some(metadata) = &result.metadata {
        eprintln!("{}", serde_json::to_string_pretty(metadata)?);
    }
    println!("{}", result.output);
    Ok(())
}
