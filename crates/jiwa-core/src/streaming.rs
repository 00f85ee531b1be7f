//! Throttled live preview of a streamed answer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::channel::ChannelError;

pub const PREPARING_PLACEHOLDER: &str = "⚠️ Mempersiapkan respon...";
pub const NO_VALID_RESPONSE: &str = "Maaf, saya tidak mendapat respon yang valid.";
pub const CURSOR: char = '▌';

const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(300);
const DEFAULT_PREVIEW_CHARS: usize = 200;
const BASE_DELAY: Duration = Duration::from_millis(500);
const DELAY_STEP: Duration = Duration::from_millis(10);
const MAX_DELAY_REDUCTION: Duration = Duration::from_millis(400);
const CURSOR_WINDOW: Duration = Duration::from_millis(500);

/// Source of monotonic time for throttling decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: std::sync::Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.lock().map_or_else(|_| Instant::now(), |n| *n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Preparing,
    Streaming,
    Finalized,
}

/// What a preview surface is asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Preparing,
    Partial { text: String, cursor: bool },
    Final { text: String },
    /// One-off progress line, independent of the answer text.
    Status(String),
    /// Preview withdrawn without a final answer.
    Cleared,
}

pub trait PreviewDisplay {
    /// # Errors
    ///
    /// Returns an error if the frame cannot be drawn.
    fn render(&mut self, frame: &Frame) -> Result<(), ChannelError>;
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

pub struct StreamController<D> {
    display: D,
    clock: Arc<dyn Clock>,
    state: StreamState,
    buffer: String,
    tokens: usize,
    last_redraw: Instant,
    last_token: Option<Instant>,
    min_interval: Duration,
    preview_chars: usize,
    redraws: usize,
}

impl<D: PreviewDisplay> StreamController<D> {
    #[must_use]
    pub fn new(display: D, clock: Arc<dyn Clock>) -> Self {
        let last_redraw = clock.now();
        Self {
            display,
            clock,
            state: StreamState::Idle,
            buffer: String::new(),
            tokens: 0,
            last_redraw,
            last_token: None,
            min_interval: DEFAULT_MIN_INTERVAL,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            redraws: 0,
        }
    }

    #[must_use]
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    #[must_use]
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of frames drawn so far, status lines included.
    #[must_use]
    pub fn redraws(&self) -> usize {
        self.redraws
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn start(&mut self) {
        self.state = StreamState::Preparing;
        self.buffer.clear();
        self.tokens = 0;
        self.last_token = None;
        self.last_redraw = self.clock.now();
        self.draw(&Frame::Preparing);
    }

    pub fn on_token(&mut self, token: &str) {
        self.state = StreamState::Streaming;
        self.buffer.push_str(token);
        self.tokens += 1;

        let now = self.clock.now();
        let cursor = self
            .last_token
            .is_some_and(|prev| now.saturating_duration_since(prev) < CURSOR_WINDOW);
        self.last_token = Some(now);

        if now.saturating_duration_since(self.last_redraw) >= self.redraw_delay() {
            let frame = Frame::Partial {
                text: truncate_preview(&self.buffer, self.preview_chars),
                cursor,
            };
            self.draw(&frame);
            self.last_redraw = now;
        }
    }

    /// Draw the final frame and hand back the complete response.
    pub fn finish(&mut self) -> String {
        if self.buffer.trim().is_empty() {
            self.buffer = NO_VALID_RESPONSE.to_owned();
        }
        self.state = StreamState::Finalized;
        let frame = Frame::Final {
            text: truncate_preview(&self.buffer, self.preview_chars),
        };
        self.draw(&frame);
        self.buffer.clone()
    }

    /// Withdraw a started preview, e.g. when generation failed midway.
    pub fn abort(&mut self) {
        if matches!(self.state, StreamState::Preparing | StreamState::Streaming) {
            self.draw(&Frame::Cleared);
        }
        self.state = StreamState::Finalized;
    }

    pub fn status(&mut self, text: &str) {
        self.draw(&Frame::Status(text.to_owned()));
    }

    /// Shrinks from 0.5s as tokens accumulate, never below `min_interval`.
    fn redraw_delay(&self) -> Duration {
        let steps = u32::try_from(self.tokens).unwrap_or(u32::MAX);
        let reduction = DELAY_STEP.saturating_mul(steps).min(MAX_DELAY_REDUCTION);
        (BASE_DELAY - reduction).max(self.min_interval)
    }

    fn draw(&mut self, frame: &Frame) {
        self.redraws += 1;
        if let Err(e) = self.display.render(frame) {
            tracing::warn!("preview redraw failed: {e}");
        }
    }
}
