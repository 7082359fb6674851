//! Interactive tutoring loop.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::error::Result;
use crate::persona::CLEAR_CONFIRMATION;
use crate::session::{TurnOutcome, TutorSession};

use super::terminal::{startup_banner, Notices, TerminalView};

const PROMPT: &str = "> ";

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    History,
    Clear,
    Help,
    Say(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Self::Empty,
            "/quit" | "/exit" | "/q" => Self::Quit,
            "/history" => Self::History,
            "/clear" => Self::Clear,
            "/help" => Self::Help,
            _ => Self::Say(trimmed.to_string()),
        }
    }
}

/// Whether a confirmation answer means yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Install a [`Notices`] observer on the session's history.
pub fn watch(session: &mut TutorSession) -> Notices {
    let notices = Notices::new();
    session
        .history_mut()
        .set_observer(Some(Box::new(notices.clone())));
    notices
}

/// Ask `question` and read the answer from the next input line. EOF is a no.
pub async fn confirm<R, W>(lines: &mut Lines<R>, out: &mut W, question: &str) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{question} [y/N] ")?;
    out.flush()?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(is_affirmative(&answer))
}

/// Run one turn, streaming the reply to `out`.
pub async fn ask<W: Write + Send>(
    session: &mut TutorSession,
    prompt: &str,
    out: &mut W,
) -> Result<Option<TurnOutcome>> {
    let mut view = TerminalView::new(out);
    session.submit(prompt, &mut view).await
}

/// Read lines from `input` until EOF or `/quit`, answering each one.
pub async fn run<R, W>(session: &mut TutorSession, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let notices = watch(session);
    writeln!(out, "{}", startup_banner(session.history()))?;
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                writeln!(out, "/history  show the study history")?;
                writeln!(out, "/clear    clear the study history")?;
                writeln!(out, "/quit     leave")?;
            }
            ReplCommand::History => {
                writeln!(out, "{}", session.history().transcript())?;
            }
            ReplCommand::Clear => {
                if confirm(&mut lines, &mut out, CLEAR_CONFIRMATION).await? {
                    session.clear()?;
                }
            }
            ReplCommand::Say(text) => {
                ask(session, &text, &mut out).await?;
            }
        }
        notices.flush(&mut out)?;
    }
    Ok(())
}
