//! Examus CLI binary entry point.

use std::sync::Arc;

use examus::cli::{repl, Cli, Commands};
use examus::config::ExamusConfig;
use examus::history::HistoryStore;
use examus::persona::CLEAR_CONFIRMATION;
use examus::session::TutorSession;
use examus::storage::FileKeyValueStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse_args();

    let result = match load_config(&cli) {
        Ok(config) => match cli.command() {
            Commands::Chat => handle_chat(&config).await,
            Commands::Ask(args) => handle_ask(&config, &args.text()).await,
            Commands::History => handle_history(&config),
            Commands::Clear(args) => handle_clear(&config, args.yes).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so they never interleave with a streamed reply.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> examus::error::Result<ExamusConfig> {
    let mut config = ExamusConfig::from_env()?;
    cli.options.apply(&mut config)?;
    Ok(config)
}

async fn handle_chat(config: &ExamusConfig) -> examus::error::Result<()> {
    let mut session = TutorSession::from_config(config)?;
    let input = BufReader::new(tokio::io::stdin());
    repl::run(&mut session, input, std::io::stdout()).await
}

async fn handle_ask(config: &ExamusConfig, prompt: &str) -> examus::error::Result<()> {
    let mut session = TutorSession::from_config(config)?;
    let notices = repl::watch(&mut session);
    let mut out = std::io::stdout();
    repl::ask(&mut session, prompt, &mut out).await?;
    notices.flush(&mut out)?;
    Ok(())
}

fn open_history(config: &ExamusConfig) -> examus::error::Result<HistoryStore> {
    let storage = Arc::new(FileKeyValueStore::new(config.data_dir.clone()));
    HistoryStore::open(storage)
}

fn handle_history(config: &ExamusConfig) -> examus::error::Result<()> {
    let history = open_history(config)?;
    println!("{}", history.transcript());
    Ok(())
}

async fn handle_clear(config: &ExamusConfig, yes: bool) -> examus::error::Result<()> {
    if !yes {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut out = std::io::stdout();
        if !repl::confirm(&mut lines, &mut out, CLEAR_CONFIRMATION).await? {
            return Ok(());
        }
    }
    let mut history = open_history(config)?;
    history.clear()?;
    println!("History cleared.");
    Ok(())
}
