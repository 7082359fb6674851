//! CLI entry point for Examus.

pub mod repl;
pub mod terminal;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ExamusConfig;
use crate::error::Result;
use crate::types::{ContextMode, FramingMode};

/// Examus AI tutor CLI
#[derive(Parser, Debug)]
#[command(name = "examus", version, about = "Examus: an AI exam tutor in your terminal")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides applied on top of env and config file.
#[derive(Args, Debug, Default)]
pub struct GlobalOptions {
    /// Model served by the endpoint (e.g. gemma3:1b)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory holding history and config.toml
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long, global = true)]
    pub temperature: Option<f64>,

    /// Max tokens
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// How the response stream is split into JSON objects (buffered, per-chunk)
    #[arg(long, global = true)]
    pub framing: Option<FramingMode>,

    /// Whether the new question is repeated inside the context window (include-input, exclude-input)
    #[arg(long, global = true)]
    pub context: Option<ContextMode>,
}

impl GlobalOptions {
    /// Apply the flags that were given and re-validate.
    ///
    /// A changed data dir does not re-read `config.toml`; pass it through
    /// `EXAMUS_DATA_DIR` for that.
    pub fn apply(&self, config: &mut ExamusConfig) -> Result<()> {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(t) = self.temperature {
            config.settings.temperature = t;
        }
        if let Some(max) = self.max_tokens {
            config.settings.max_tokens = max;
        }
        if let Some(framing) = self.framing {
            config.framing = framing;
        }
        if let Some(context) = self.context {
            config.context = context;
        }
        config.validate()
    }
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive tutoring session (default)
    Chat,
    /// Ask a single question and stream the answer
    Ask(AskArgs),
    /// Print the stored study history
    History,
    /// Clear the stored study history
    Clear(ClearArgs),
}

/// Arguments for `examus ask`.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question for the tutor
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.prompt.join(" ")
    }
}

/// Arguments for `examus clear`.
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run; no subcommand means `chat`.
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&DEFAULT_COMMAND)
    }
}

static DEFAULT_COMMAND: Commands = Commands::Chat;
