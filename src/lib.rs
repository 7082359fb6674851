//! Examus: an AI exam tutor that streams replies from a local Ollama endpoint.
//!
//! The crate keeps a bounded, persisted conversation log ([`history`]) and
//! assembles streamed replies fragment by fragment ([`assembler`]). A
//! [`session::TutorSession`] ties the two together and runs one turn at a time.
//!
//! # Quick Start
//!
//! ```no_run
//! use examus::prelude::*;
//! use examus::assembler::NullView;
//!
//! # async fn example() -> examus::error::Result<()> {
//! let config = ExamusConfig::from_env()?;
//! let mut session = TutorSession::from_config(&config)?;
//! if let Some(turn) = session.submit("Explain photosynthesis", &mut NullView).await? {
//!     println!("{}", turn.reply.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod history;
pub mod persona;
pub mod prelude;
pub mod provider;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
