use std::io::{IsTerminal, Write, stdout};

use crossterm::terminal::{self, ClearType};
use jiwa_core::channel::{Channel, ChannelError};
use jiwa_core::Frame;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::line_editor::{self, ReadLineResult};
use crate::preview::preview_line;

const PROMPT: &str = "Anda: ";
const REPLY_PREFIX: &str = "AI: ";
const MAX_HISTORY: usize = 500;
const FALLBACK_WIDTH: usize = 80;

/// Terminal channel: line editing on a TTY, plain line reads when piped.
pub struct CliChannel {
    history: Vec<String>,
    piped: Option<Lines<BufReader<Stdin>>>,
    preview_visible: bool,
}

impl std::fmt::Debug for CliChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliChannel")
            .field("history_len", &self.history.len())
            .field("piped", &self.piped.is_some())
            .finish_non_exhaustive()
    }
}

impl CliChannel {
    #[must_use]
    pub fn new() -> Self {
        let piped = (!std::io::stdin().is_terminal())
            .then(|| BufReader::new(tokio::io::stdin()).lines());
        Self {
            history: Vec::new(),
            piped,
            preview_visible: false,
        }
    }

    fn remember(&mut self, line: &str) {
        if line.is_empty() || self.history.last().is_some_and(|last| last == line) {
            return;
        }
        if self.history.len() == MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(line.to_owned());
    }

    fn clear_preview(&mut self) -> Result<(), ChannelError> {
        if self.preview_visible {
            let mut out = stdout();
            write!(out, "\r{}", terminal::Clear(ClearType::CurrentLine))?;
            out.flush()?;
            self.preview_visible = false;
        }
        Ok(())
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

fn terminal_width() -> usize {
    match terminal::size() {
        Ok((cols, _)) if cols > 0 => usize::from(cols),
        Ok(_) => FALLBACK_WIDTH,
        Err(e) => {
            tracing::debug!("terminal size unavailable, assuming {FALLBACK_WIDTH} columns: {e}");
            FALLBACK_WIDTH
        }
    }
}

/// `None` when the user asked to leave.
fn accept_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed == "exit" || trimmed == "quit" {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

impl Channel for CliChannel {
    async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
        self.clear_preview()?;

        let line = if let Some(lines) = self.piped.as_mut() {
            match lines.next_line().await? {
                Some(line) => line,
                None => {
                    tracing::debug!("piped input exhausted");
                    return Ok(None);
                }
            }
        } else {
            let history = self.history.clone();
            let result = tokio::task::spawn_blocking(move || line_editor::read_line(PROMPT, &history))
                .await
                .map_err(|e| {
                    tracing::error!("line editor task failed: {e}");
                    ChannelError::Other(e.to_string())
                })?
                .map_err(ChannelError::Io)?;
            match result {
                ReadLineResult::Interrupted => {
                    tracing::info!("input interrupted, leaving chat");
                    return Ok(None);
                }
                ReadLineResult::Eof => {
                    tracing::debug!("end of terminal input");
                    return Ok(None);
                }
                ReadLineResult::Line(line) => line,
            }
        };

        let accepted = accept_line(&line);
        if let Some(text) = &accepted {
            self.remember(text);
        }
        Ok(accepted)
    }

    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        self.clear_preview()?;
        println!("{REPLY_PREFIX}{text}\n");
        Ok(())
    }

    async fn send_status(&mut self, text: &str) -> Result<(), ChannelError> {
        self.clear_preview()?;
        println!("{text}");
        Ok(())
    }

    fn render_preview(&mut self, frame: &Frame) -> Result<(), ChannelError> {
        if let Frame::Status(text) = frame {
            self.clear_preview()?;
            println!("{text}");
            return Ok(());
        }

        match preview_line(frame, terminal_width()) {
            Some(line) => {
                let mut out = stdout();
                write!(out, "\r{}{line}", terminal::Clear(ClearType::CurrentLine))?;
                out.flush()?;
                self.preview_visible = true;
            }
            None => self.clear_preview()?,
        }
        Ok(())
    }
}
