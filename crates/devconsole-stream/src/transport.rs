//! Stream transport actor
//!
//! One task owns the link, the pending command queue and the reconnect
//! timer. [`StreamTransport`] is a cheap handle: every call enqueues an
//! operation and returns immediately. Decoded envelopes and lifecycle
//! changes come out of the [`TransportEvent`] receiver returned by
//! [`StreamTransport::spawn`].

use crate::backoff::reconnect_delay;
use crate::connector::{Connector, FrameSink, FrameStream};
use devconsole_config::ReconnectConfig;
use devconsole_core::{Command, ConnectionStatus, Envelope, Error, Result};
use futures::future::BoxFuture;
use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Sleep;
use tracing::{debug, error, info, warn};

/// What the transport reports to its consumer
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Lifecycle change. `Error` is transient and followed by the real state.
    Status(ConnectionStatus),
    /// A decoded inbound envelope
    Envelope(Envelope),
    /// A reconnect attempt was scheduled (`attempt` is 0-based)
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// Transport-level failure detail
    Failure { message: String },
}

#[derive(Debug)]
enum Op {
    Connect,
    Close,
    Send(Command),
}

/// Handle to the transport task.
///
/// The task stops once every handle is dropped.
#[derive(Clone)]
pub struct StreamTransport {
    ops: mpsc::UnboundedSender<Op>,
    status: watch::Receiver<ConnectionStatus>,
    attempt: Arc<AtomicU32>,
}

impl StreamTransport {
    /// Spawn the transport task on the current runtime.
    ///
    /// The transport starts `Disconnected`; call [`connect`](Self::connect)
    /// to open the link.
    pub fn spawn(
        connector: Arc<dyn Connector>,
        config: ReconnectConfig,
    ) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::channel(config.event_channel_capacity.max(1));
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let attempt = Arc::new(AtomicU32::new(0));

        let driver = Driver {
            connector,
            config,
            ops: ops_rx,
            events: events_tx,
            status: status_tx,
            attempt: Arc::clone(&attempt),
            pending: VecDeque::new(),
            manual_closed: false,
            phase: Phase::Idle,
        };
        tokio::spawn(driver.run());

        let handle = Self {
            ops: ops_tx,
            status: status_rx,
            attempt,
        };
        (handle, events_rx)
    }

    /// Open the link unless it is already open or opening
    pub fn connect(&self) -> Result<()> {
        self.enqueue(Op::Connect)
    }

    /// Close the link and stop reconnecting. Queued commands are kept.
    pub fn close(&self) -> Result<()> {
        self.enqueue(Op::Close)
    }

    /// Send now if open, otherwise queue for the next successful open
    pub fn send_command(&self, command: Command) -> Result<()> {
        self.enqueue(Op::Send(command))
    }

    pub fn subscribe<S: Into<String>>(&self, panels: impl IntoIterator<Item = S>) -> Result<()> {
        self.send_command(Command::subscribe(panels))
    }

    pub fn unsubscribe<S: Into<String>>(&self, panels: impl IntoIterator<Item = S>) -> Result<()> {
        self.send_command(Command::unsubscribe(panels))
    }

    pub fn request_snapshot(&self) -> Result<()> {
        self.send_command(Command::snapshot())
    }

    /// Ask the server to clear `panels` (all panels when `None`)
    pub fn clear(&self, panels: Option<Vec<String>>) -> Result<()> {
        self.send_command(Command::clear(panels))
    }

    /// Current lifecycle status (never `Error`)
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Watch lifecycle status changes
    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Index of the next reconnect attempt; 0 after a successful open
    pub fn reconnect_attempt(&self) -> u32 {
        self.attempt.load(Ordering::SeqCst)
    }

    fn enqueue(&self, op: Op) -> Result<()> {
        self.ops
            .send(op)
            .map_err(|_| Error::ChannelClosed("transport"))
    }
}

// ============================================================================
// Driver
// ============================================================================

type ConnectFuture = BoxFuture<'static, Result<(FrameSink, FrameStream)>>;

enum Phase {
    /// No link and nothing scheduled
    Idle,
    Connecting(ConnectFuture),
    Open { sink: FrameSink, stream: FrameStream },
    /// Waiting for the reconnect timer
    Backoff(Pin<Box<Sleep>>),
}

enum Step {
    Op(Option<Op>),
    Opened(Result<(FrameSink, FrameStream)>),
    Frame(Option<Result<String>>),
    RetryDue,
}

struct Driver {
    connector: Arc<dyn Connector>,
    config: ReconnectConfig,
    ops: mpsc::UnboundedReceiver<Op>,
    events: mpsc::Sender<TransportEvent>,
    status: watch::Sender<ConnectionStatus>,
    attempt: Arc<AtomicU32>,
    pending: VecDeque<Command>,
    manual_closed: bool,
    phase: Phase,
}

impl Driver {
    async fn run(mut self) {
        loop {
            let step = match &mut self.phase {
                Phase::Idle => Step::Op(self.ops.recv().await),
                Phase::Connecting(opening) => tokio::select! {
                    biased;
                    op = self.ops.recv() => Step::Op(op),
                    result = opening => Step::Opened(result),
                },
                Phase::Open { stream, .. } => tokio::select! {
                    biased;
                    op = self.ops.recv() => Step::Op(op),
                    frame = stream.next() => Step::Frame(frame),
                },
                Phase::Backoff(timer) => tokio::select! {
                    biased;
                    op = self.ops.recv() => Step::Op(op),
                    () = timer => Step::RetryDue,
                },
            };

            match step {
                Step::Op(Some(op)) => self.handle_op(op).await,
                Step::Op(None) => {
                    debug!("All transport handles dropped, shutting down");
                    self.drop_link().await;
                    break;
                }
                Step::Opened(Ok((sink, stream))) => self.on_open(sink, stream).await,
                Step::Opened(Err(e)) => {
                    warn!(attempt = self.attempt(), error = %e, "Connection attempt failed");
                    self.phase = Phase::Idle;
                    self.report_failure(e.to_string()).await;
                    self.schedule_reconnect().await;
                }
                Step::Frame(Some(Ok(text))) => self.on_frame(&text).await,
                Step::Frame(Some(Err(e))) => {
                    warn!(error = %e, "Stream read failed");
                    self.link_lost(e.to_string()).await;
                }
                Step::Frame(None) => {
                    info!("Stream closed by server");
                    self.phase = Phase::Idle;
                    self.schedule_reconnect().await;
                }
                Step::RetryDue => self.start_connect().await,
            }
        }
    }

    async fn handle_op(&mut self, op: Op) {
        match op {
            Op::Connect => {
                self.manual_closed = false;
                match self.phase {
                    Phase::Connecting(_) | Phase::Open { .. } => {
                        debug!(status = %self.current(), "Connect ignored, already open or opening");
                    }
                    Phase::Idle => {
                        // Manual connect after exhaustion starts a fresh cycle
                        self.set_attempt(0);
                        self.start_connect().await;
                    }
                    Phase::Backoff(_) => self.start_connect().await,
                }
            }
            Op::Close => {
                info!(queued = self.pending.len(), "Closing stream");
                self.manual_closed = true;
                self.drop_link().await;
                self.set_status(ConnectionStatus::Disconnected).await;
            }
            Op::Send(command) => {
                if let Phase::Open { sink, .. } = &mut self.phase {
                    if let Err(e) = send_frame(sink, &command).await {
                        warn!(command = %command.kind, error = %e, "Send failed, requeueing");
                        self.pending.push_back(command);
                        self.link_lost(e.to_string()).await;
                    }
                } else {
                    self.pending.push_back(command);
                    debug!(
                        status = %self.current(),
                        queued = self.pending.len(),
                        "Not connected, command queued"
                    );
                }
            }
        }
    }

    async fn start_connect(&mut self) {
        let connector = Arc::clone(&self.connector);
        self.phase = Phase::Connecting(Box::pin(async move { connector.connect().await }));
        self.set_status(ConnectionStatus::Connecting).await;
    }

    async fn on_open(&mut self, sink: FrameSink, stream: FrameStream) {
        info!(queued = self.pending.len(), "Stream connected");
        self.phase = Phase::Open { sink, stream };
        self.set_attempt(0);
        self.set_status(ConnectionStatus::Connected).await;
        self.flush_pending().await;
    }

    /// Send every queued command in FIFO order, stopping at the first failure
    async fn flush_pending(&mut self) {
        let Phase::Open { sink, .. } = &mut self.phase else {
            return;
        };

        let mut sent = 0usize;
        let mut failure = None;
        while let Some(command) = self.pending.pop_front() {
            if let Err(e) = send_frame(sink, &command).await {
                self.pending.push_front(command);
                failure = Some(e);
                break;
            }
            sent += 1;
        }

        if sent > 0 {
            debug!(sent, "Flushed queued commands");
        }
        if let Some(e) = failure {
            warn!(error = %e, remaining = self.pending.len(), "Flush interrupted");
            self.link_lost(e.to_string()).await;
        }
    }

    async fn on_frame(&mut self, text: &str) {
        match Envelope::decode(text) {
            Ok(envelope) => self.emit(TransportEvent::Envelope(envelope)).await,
            // Malformed frames are dropped without surfacing anything
            Err(e) => debug!(error = %e, len = text.len(), "Discarding malformed frame"),
        }
    }

    /// The open link failed: report it and go through the reconnect policy
    async fn link_lost(&mut self, message: String) {
        self.phase = Phase::Idle;
        self.report_failure(message).await;
        self.schedule_reconnect().await;
    }

    async fn schedule_reconnect(&mut self) {
        if self.manual_closed || !self.config.enabled {
            self.phase = Phase::Idle;
            self.set_status(ConnectionStatus::Disconnected).await;
            return;
        }

        let attempt = self.attempt();
        if attempt >= self.config.max_attempts {
            error!(
                max_attempts = self.config.max_attempts,
                "Reconnect attempts exhausted, staying disconnected"
            );
            self.phase = Phase::Idle;
            self.set_status(ConnectionStatus::Disconnected).await;
            return;
        }

        let delay = reconnect_delay(attempt, self.config.base_delay(), self.config.max_delay());
        info!(
            attempt = attempt,
            max_attempts = self.config.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        self.set_attempt(attempt + 1);
        self.phase = Phase::Backoff(Box::pin(tokio::time::sleep(delay)));
        self.set_status(ConnectionStatus::Reconnecting).await;
        self.emit(TransportEvent::ReconnectScheduled { attempt, delay })
            .await;
    }

    /// Close and forget whatever link or timer is active
    async fn drop_link(&mut self) {
        if let Phase::Open { mut sink, .. } = std::mem::replace(&mut self.phase, Phase::Idle) {
            if let Err(e) = sink.close().await {
                debug!(error = %e, "Error while closing stream");
            }
        }
    }

    async fn report_failure(&mut self, message: String) {
        self.emit(TransportEvent::Status(ConnectionStatus::Error))
            .await;
        self.emit(TransportEvent::Failure { message }).await;
    }

    async fn set_status(&mut self, status: ConnectionStatus) {
        if self.current() == status {
            return;
        }
        self.status.send_replace(status);
        self.emit(TransportEvent::Status(status)).await;
    }

    async fn emit(&mut self, event: TransportEvent) {
        if self.events.send(event).await.is_err() {
            debug!("Transport event receiver dropped");
        }
    }

    fn current(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    fn attempt(&self) -> u32 {
        self.attempt.load(Ordering::SeqCst)
    }

    fn set_attempt(&self, value: u32) {
        self.attempt.store(value, Ordering::SeqCst);
    }
}

async fn send_frame(sink: &mut FrameSink, command: &Command) -> Result<()> {
    let text = command.to_json()?;
    sink.send(text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Refusing;

    #[async_trait]
    impl Connector for Refusing {
        async fn connect(&self) -> Result<(FrameSink, FrameStream)> {
            Err(Error::Transport("refused".to_string()))
        }
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_driver_future_is_send() {
        let (_ops_tx, ops) = mpsc::unbounded_channel();
        let (events, _events_rx) = mpsc::channel(1);
        let (status, _status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let driver = Driver {
            connector: Arc::new(Refusing),
            config: ReconnectConfig::default(),
            ops,
            events,
            status,
            attempt: Arc::new(AtomicU32::new(0)),
            pending: VecDeque::new(),
            manual_closed: false,
            phase: Phase::Idle,
        };

        // tokio::spawn needs the whole driver loop to be Send
        assert_send(&driver.run());
    }
}
