//! Shared doubles for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jiwa_index::{Retrieval, RetrieverError, ScoredChunk, Searcher};
use jiwa_tools::{ToolError, WebSearch};

use crate::channel::{Channel, ChannelError};
use crate::streaming::Frame;

#[derive(Clone)]
pub struct CountingSearcher {
    outcome: Retrieval,
    calls: Arc<AtomicUsize>,
}

impl CountingSearcher {
    pub fn new(outcome: Retrieval) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn hits(texts: &[&str]) -> Self {
        let hits = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ScoredChunk {
                id: format!("c{i}"),
                text: (*t).to_owned(),
                source: "faq.csv".into(),
                row: i,
                chunk_index: 0,
                score: 0.9,
            })
            .collect();
        Self::new(Retrieval::Hits(hits))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Searcher for CountingSearcher {
    async fn search(&self, _query: &str, _k: usize) -> Result<Retrieval, RetrieverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}

#[derive(Clone)]
pub struct CountingWeb {
    urls: Vec<String>,
    fail: bool,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl CountingWeb {
    pub fn with_urls(urls: &[&str]) -> Self {
        Self {
            urls: urls.iter().map(|u| (*u).to_owned()).collect(),
            fail: false,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_urls(&[])
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WebSearch for CountingWeb {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<String>, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ToolError::Status {
                service: "search",
                status: 503,
            });
        }
        Ok(self.urls.iter().take(limit).cloned().collect())
    }
}

/// Scripted channel recording everything the agent emits.
#[derive(Default)]
pub struct MockChannel {
    inputs: VecDeque<String>,
    pub sent: Arc<Mutex<Vec<String>>>,
    pub statuses: Arc<Mutex<Vec<String>>>,
    pub frames: Arc<Mutex<Vec<Frame>>>,
    fail_send: bool,
}

impl MockChannel {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| (*s).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub fn with_failing_sends(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl Channel for MockChannel {
    async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
        Ok(self.inputs.pop_front())
    }

    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        if self.fail_send {
            return Err(ChannelError::ChannelClosed);
        }
        self.sent.lock().unwrap().push(text.to_owned());
        Ok(())
    }

    async fn send_status(&mut self, text: &str) -> Result<(), ChannelError> {
        self.statuses.lock().unwrap().push(text.to_owned());
        Ok(())
    }

    fn render_preview(&mut self, frame: &Frame) -> Result<(), ChannelError> {
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }
}
