use std::io::{self, Write, stdout};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
};
use unicode_width::UnicodeWidthStr;

pub enum ReadLineResult {
    Line(String),
    Interrupted,
    Eof,
}

/// Restores cooked mode even when reading fails midway.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Editable single line: chars, cursor in chars, and a position in `history`.
#[derive(Debug, Default)]
struct LineState {
    input: Vec<char>,
    cursor: usize,
    recalled: Option<usize>,
    draft: Vec<char>,
}

impl LineState {
    fn text(&self) -> String {
        self.input.iter().collect()
    }

    fn insert(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.len());
    }

    fn older(&mut self, history: &[String]) {
        let next = match self.recalled {
            None if history.is_empty() => return,
            None => {
                self.draft = std::mem::take(&mut self.input);
                history.len() - 1
            }
            Some(0) => return,
            Some(i) => i - 1,
        };
        self.recall(history, next);
    }

    fn newer(&mut self, history: &[String]) {
        match self.recalled {
            None => {}
            Some(i) if i + 1 < history.len() => self.recall(history, i + 1),
            Some(_) => {
                self.recalled = None;
                self.input = std::mem::take(&mut self.draft);
                self.cursor = self.input.len();
            }
        }
    }

    fn recall(&mut self, history: &[String], idx: usize) {
        self.recalled = Some(idx);
        self.input = history[idx].chars().collect();
        self.cursor = self.input.len();
    }
}

pub fn read_line(prompt: &str, history: &[String]) -> io::Result<ReadLineResult> {
    let _guard = RawModeGuard::enter()?;
    let mut line = LineState::default();
    render(prompt, &line)?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                finish_line()?;
                return Ok(ReadLineResult::Interrupted);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('d')) if line.input.is_empty() => {
                finish_line()?;
                return Ok(ReadLineResult::Eof);
            }
            (_, KeyCode::Enter) => {
                finish_line()?;
                return Ok(ReadLineResult::Line(line.text()));
            }
            (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => line.cursor = 0,
            (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => {
                line.cursor = line.input.len();
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                line.input.clear();
                line.cursor = 0;
            }
            (_, KeyCode::Backspace) => line.backspace(),
            (_, KeyCode::Delete) => line.delete(),
            (_, KeyCode::Left) => line.left(),
            (_, KeyCode::Right) => line.right(),
            (_, KeyCode::Up) => line.older(history),
            (_, KeyCode::Down) => line.newer(history),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => line.insert(c),
            _ => {}
        }

        render(prompt, &line)?;
    }
}

fn finish_line() -> io::Result<()> {
    let mut out = stdout();
    write!(out, "\r\n")?;
    out.flush()
}

fn render(prompt: &str, line: &LineState) -> io::Result<()> {
    let mut out = stdout();
    let before: String = line.input[..line.cursor].iter().collect();
    let column = prompt.width() + before.width();
    write!(
        out,
        "\r{}{}{}{}",
        terminal::Clear(ClearType::CurrentLine),
        prompt,
        line.text(),
        cursor::MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX)),
    )?;
    out.flush()
}
