//! Console controller
//!
//! Wires the transport, the store and the notifier together. A single task
//! owns writes to the [`PanelStore`]: it hydrates from HTTP once, then
//! applies transport events and operator operations one at a time. Readers
//! take the store's read lock through [`ConsoleController::read`] and watch
//! the render generation to know when to redraw.

use crate::notifier::{NoticeLevel, NotifierRef};
use crate::reconciler::SnapshotClient;
use crate::router::{self, Dispatch};
use crate::store::{PanelStore, StoreStats};
use devconsole_config::{ConsoleConfig, ConsoleSection, ReconnectConfig};
use devconsole_core::{ConnectionStatus, Error, Result, Snapshot};
use devconsole_stream::{Connector, Endpoints, StreamTransport, TransportEvent, WsConnector};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

#[derive(Debug)]
enum ControlOp {
    Connect,
    Close,
    Pause,
    Resume,
    Clear(Option<Vec<String>>),
}

/// Handle to a running console session.
///
/// Cloning is cheap. The session stops and closes its stream once every
/// handle is dropped.
#[derive(Clone)]
pub struct ConsoleController {
    store: Arc<RwLock<PanelStore>>,
    render: watch::Receiver<u64>,
    transport: StreamTransport,
    ops: mpsc::UnboundedSender<ControlOp>,
    slow_query_ms: u64,
}

impl std::fmt::Debug for ConsoleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleController")
            .field("status", &self.status())
            .field("render_generation", &self.render_generation())
            .finish()
    }
}

impl ConsoleController {
    /// Start a session against the server named in `config`.
    ///
    /// Builds the WebSocket connector and the snapshot client from the base
    /// URL, then spawns the session on the current runtime.
    pub fn from_config(config: &ConsoleConfig, notifier: NotifierRef) -> Result<Self> {
        let endpoints = Endpoints::new(&config.console.base_url)?;
        let timeout = Duration::from_millis(config.console.http_timeout_ms);
        let connector = WsConnector::new(endpoints.stream_url()?, timeout);
        let snapshots = SnapshotClient::new(endpoints, timeout)?;

        Ok(Self::spawn(
            &config.console,
            config.stream.clone(),
            Arc::new(connector),
            Some(snapshots),
            notifier,
        ))
    }

    /// Start a session with explicit collaborators.
    ///
    /// Without a `snapshots` client the store starts empty and clears are
    /// sent over the stream instead of HTTP.
    pub fn spawn(
        section: &ConsoleSection,
        reconnect: ReconnectConfig,
        connector: Arc<dyn Connector>,
        snapshots: Option<SnapshotClient>,
        notifier: NotifierRef,
    ) -> Self {
        let store = Arc::new(RwLock::new(PanelStore::from_section(section)));
        let (render_tx, render_rx) = watch::channel(0u64);
        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        let (transport, events) = StreamTransport::spawn(connector, reconnect);

        let session = Session {
            store: Arc::clone(&store),
            render: render_tx,
            transport: transport.clone(),
            events,
            ops: ops_rx,
            snapshots,
            notifier,
            panels: section.panels.clone(),
            last_status: ConnectionStatus::Disconnected,
            ever_connected: false,
            manual_close: false,
            failure_reported: false,
        };
        tokio::spawn(session.run());

        Self {
            store,
            render: render_rx,
            transport,
            ops: ops_tx,
            slow_query_ms: section.slow_query_ms,
        }
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    /// Run `f` against the current store under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&PanelStore) -> R) -> R {
        let guard = read_lock(&self.store);
        f(&*guard)
    }

    /// Copy of every panel
    pub fn snapshot(&self) -> Snapshot {
        self.read(PanelStore::to_snapshot)
    }

    pub fn stats(&self) -> StoreStats {
        self.read(|store| store.stats().clone())
    }

    pub fn is_paused(&self) -> bool {
        self.read(PanelStore::is_paused)
    }

    /// Bumped after every change a renderer should show
    pub fn render_watch(&self) -> watch::Receiver<u64> {
        self.render.clone()
    }

    pub fn render_generation(&self) -> u64 {
        *self.render.borrow()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.transport.status()
    }

    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.transport.status_watch()
    }

    pub fn reconnect_attempt(&self) -> u32 {
        self.transport.reconnect_attempt()
    }

    /// Configured SQL slow-query threshold
    pub fn slow_query_ms(&self) -> u64 {
        self.slow_query_ms
    }

    // ========================================================================
    // Operator commands
    // ========================================================================

    pub fn connect(&self) -> Result<()> {
        self.enqueue(ControlOp::Connect)
    }

    pub fn close(&self) -> Result<()> {
        self.enqueue(ControlOp::Close)
    }

    /// Stop storing events. They are still counted.
    pub fn pause(&self) -> Result<()> {
        self.enqueue(ControlOp::Pause)
    }

    /// Resume storing and ask the server for a fresh snapshot
    pub fn resume(&self) -> Result<()> {
        self.enqueue(ControlOp::Resume)
    }

    /// Clear panels locally and on the server (all panels when `None`)
    pub fn clear(&self, panels: Option<Vec<String>>) -> Result<()> {
        self.enqueue(ControlOp::Clear(panels))
    }

    pub fn subscribe<S: Into<String>>(&self, panels: impl IntoIterator<Item = S>) -> Result<()> {
        self.transport.subscribe(panels)
    }

    pub fn unsubscribe<S: Into<String>>(&self, panels: impl IntoIterator<Item = S>) -> Result<()> {
        self.transport.unsubscribe(panels)
    }

    /// Ask the server to push a snapshot. The reply replaces every panel,
    /// paused or not.
    pub fn request_snapshot(&self) -> Result<()> {
        self.transport.request_snapshot()
    }

    fn enqueue(&self, op: ControlOp) -> Result<()> {
        self.ops.send(op).map_err(|_| Error::ChannelClosed("console"))
    }
}

// ============================================================================
// Session task
// ============================================================================

struct Session {
    store: Arc<RwLock<PanelStore>>,
    render: watch::Sender<u64>,
    transport: StreamTransport,
    events: mpsc::Receiver<TransportEvent>,
    ops: mpsc::UnboundedReceiver<ControlOp>,
    snapshots: Option<SnapshotClient>,
    notifier: NotifierRef,
    panels: Vec<String>,
    last_status: ConnectionStatus,
    ever_connected: bool,
    manual_close: bool,
    /// One failure notice per outage
    failure_reported: bool,
}

impl Session {
    async fn run(mut self) {
        self.hydrate().await;

        let started = self
            .transport
            .subscribe(self.panels.clone())
            .and_then(|()| self.transport.connect());
        if let Err(e) = started {
            warn!(error = %e, "Transport stopped before the session started");
            return;
        }

        loop {
            tokio::select! {
                biased;
                op = self.ops.recv() => match op {
                    Some(op) => self.handle_op(op),
                    None => {
                        debug!("All console handles dropped, closing session");
                        if let Err(e) = self.transport.close() {
                            debug!(error = %e, "Transport already stopped");
                        }
                        break;
                    }
                },
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("Transport stopped");
                        break;
                    }
                },
            }
        }
    }

    /// Startup HTTP snapshot; failures leave the store empty
    async fn hydrate(&mut self) {
        let Some(client) = &self.snapshots else {
            return;
        };
        if let Some(snapshot) = client.try_fetch_snapshot().await {
            let requests = snapshot.requests.len();
            write_lock(&self.store).apply_snapshot(snapshot);
            info!(requests, "Hydrated from snapshot endpoint");
            self.bump();
        }
    }

    fn handle_op(&mut self, op: ControlOp) {
        let result = match op {
            ControlOp::Connect => {
                self.manual_close = false;
                self.transport.connect()
            }
            ControlOp::Close => {
                self.manual_close = true;
                self.transport.close()
            }
            ControlOp::Pause => {
                write_lock(&self.store).set_paused(true);
                self.notifier.notify(NoticeLevel::Info, "Console paused");
                self.bump();
                Ok(())
            }
            ControlOp::Resume => {
                write_lock(&self.store).set_paused(false);
                self.notifier.notify(NoticeLevel::Info, "Console resumed");
                self.bump();
                // Events dropped while paused are gone; resync from the server
                self.transport.request_snapshot()
            }
            ControlOp::Clear(panels) => {
                write_lock(&self.store).clear(panels.as_deref());
                self.bump();
                match &self.snapshots {
                    Some(client) => {
                        let client = client.clone();
                        tokio::spawn(async move {
                            client.clear_best_effort(panels.as_deref()).await;
                        });
                        Ok(())
                    }
                    None => self.transport.clear(panels),
                }
            }
        };

        if let Err(e) = result {
            debug!(error = %e, "Console operation not delivered");
        }
    }

    fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Envelope(envelope) => {
                let kind = envelope.kind().to_string();
                let outcome = router::dispatch(envelope, &mut write_lock(&self.store));
                trace!(kind = %kind, outcome = ?outcome, "Dispatched event");
                if outcome == Dispatch::Snapshot {
                    debug!("Applied pushed snapshot");
                }
                if outcome.is_visible() {
                    self.bump();
                }
            }
            TransportEvent::Status(status) => self.on_status(status),
            TransportEvent::ReconnectScheduled { attempt, delay } => {
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
                self.bump();
            }
            TransportEvent::Failure { message } => {
                if !self.failure_reported && !self.manual_close {
                    self.failure_reported = true;
                    self.notifier
                        .notify(NoticeLevel::Warning, &format!("Stream error: {}", message));
                }
            }
        }
    }

    fn on_status(&mut self, status: ConnectionStatus) {
        // Error is transient and always followed by a lifecycle status
        if status == ConnectionStatus::Error {
            return;
        }

        let previous = std::mem::replace(&mut self.last_status, status);
        match status {
            ConnectionStatus::Connected => {
                let message = if self.ever_connected {
                    "Reconnected to server"
                } else {
                    "Connected to server"
                };
                self.ever_connected = true;
                self.failure_reported = false;
                self.notifier.notify(NoticeLevel::Success, message);
            }
            ConnectionStatus::Reconnecting if previous == ConnectionStatus::Connected => {
                self.notifier
                    .notify(NoticeLevel::Warning, "Connection lost, reconnecting");
            }
            ConnectionStatus::Disconnected if previous != ConnectionStatus::Disconnected => {
                if self.manual_close {
                    self.notifier.notify(NoticeLevel::Info, "Disconnected");
                } else {
                    self.notifier.notify(
                        NoticeLevel::Error,
                        "Disconnected; reconnect manually to resume",
                    );
                }
            }
            _ => {}
        }
        self.bump();
    }

    fn bump(&self) {
        self.render.send_modify(|generation| *generation += 1);
    }
}

fn read_lock(store: &RwLock<PanelStore>) -> RwLockReadGuard<'_, PanelStore> {
    store.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock(store: &RwLock<PanelStore>) -> RwLockWriteGuard<'_, PanelStore> {
    store.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
