//! Scripted connector for transport tests
//!
//! [`MockConnector`] never touches the network. Each `connect()` pops the next
//! scripted [`MockOutcome`]; accepted links record every outbound frame and
//! let the test inject inbound frames or simulate a server-side close.

use async_trait::async_trait;
use devconsole_core::{Error, Result};
use devconsole_stream::{Connector, FrameSink, FrameStream};
use futures::channel::mpsc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Result of one scripted `connect()` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    Accept,
    Fail(String),
}

impl MockOutcome {
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

/// A connector whose outcomes are scripted by the test
///
/// # Example
///
/// ```no_run
/// use devconsole_testing::{MockConnector, MockOutcome};
/// use devconsole_stream::StreamTransport;
/// use devconsole_config::ReconnectConfig;
///
/// # #[tokio::main]
/// # async fn main() {
/// let connector = MockConnector::new();
/// connector.push_outcome(MockOutcome::fail("refused"));
/// connector.push_outcome(MockOutcome::Accept);
/// let (transport, mut events) =
///     StreamTransport::spawn(connector.clone(), ReconnectConfig::default());
/// transport.connect().unwrap();
/// # }
/// ```
#[derive(Debug)]
pub struct MockConnector {
    script: Mutex<VecDeque<MockOutcome>>,
    /// Used once the script is exhausted
    fallback: Mutex<MockOutcome>,
    connects: AtomicUsize,
    sent: Arc<Mutex<Vec<String>>>,
    fail_sends: Arc<AtomicBool>,
    inbound: Mutex<Option<mpsc::UnboundedSender<Result<String>>>>,
}

impl MockConnector {
    /// New connector that accepts every connection
    pub fn new() -> Arc<Self> {
        Self::with_fallback(MockOutcome::Accept)
    }

    /// New connector that fails every connection
    pub fn refusing() -> Arc<Self> {
        Self::with_fallback(MockOutcome::fail("connection refused"))
    }

    fn with_fallback(fallback: MockOutcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            connects: AtomicUsize::new(0),
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: Arc::new(AtomicBool::new(false)),
            inbound: Mutex::new(None),
        })
    }

    /// Queue the outcome of the next unscripted `connect()`
    pub fn push_outcome(&self, outcome: MockOutcome) {
        lock(&self.script).push_back(outcome);
    }

    /// Change what happens once the script runs out
    pub fn set_fallback(&self, outcome: MockOutcome) {
        *lock(&self.fallback) = outcome;
    }

    /// Number of `connect()` calls so far
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Every frame sent over any accepted link, in order
    pub fn sent_frames(&self) -> Vec<String> {
        lock(&self.sent).clone()
    }

    /// Make every subsequent send fail (the link looks broken)
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Deliver a text frame on the active link. Returns false without one.
    pub fn inject(&self, text: impl Into<String>) -> bool {
        match lock(&self.inbound).as_ref() {
            Some(tx) => tx.unbounded_send(Ok(text.into())).is_ok(),
            None => false,
        }
    }

    /// Deliver a read error on the active link
    pub fn inject_error(&self, message: impl Into<String>) -> bool {
        match lock(&self.inbound).as_ref() {
            Some(tx) => tx
                .unbounded_send(Err(Error::Transport(message.into())))
                .is_ok(),
            None => false,
        }
    }

    /// Simulate the server closing the active link
    pub fn close_link(&self) {
        lock(&self.inbound).take();
    }

    fn next_outcome(&self) -> MockOutcome {
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| lock(&self.fallback).clone())
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<(FrameSink, FrameStream)> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if let MockOutcome::Fail(message) = self.next_outcome() {
            return Err(Error::Transport(message));
        }

        let (tx, rx) = mpsc::unbounded();
        *lock(&self.inbound) = Some(tx);

        let sink = futures::sink::unfold(
            (Arc::clone(&self.sent), Arc::clone(&self.fail_sends)),
            |(sent, fail), text: String| async move {
                if fail.load(Ordering::SeqCst) {
                    return Err(Error::Transport("broken pipe".to_string()));
                }
                lock(&sent).push(text);
                Ok((sent, fail))
            },
        );

        Ok((Box::pin(sink), Box::pin(rx)))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
