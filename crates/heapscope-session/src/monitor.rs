use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use heapscope_table::HeapObject;

use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::notify::{ChangeNotifier, EventStream};
use crate::session::{Session, SessionStats};

/// TCP listener that feeds instrumented processes into a session.
///
/// One process is served at a time: the decoder buffer and object table
/// belong to the active connection, and a later connector waits in the
/// accept backlog until the current stream ends. Observers subscribe once
/// and keep receiving across consecutive connections.
pub struct Monitor {
    config: MonitorConfig,
    notifier: ChangeNotifier,
    session: RwLock<Session>,
}

impl Monitor {
    /// Create a monitor that will accept on `config.bind_addr`.
    pub fn new(config: MonitorConfig) -> Self {
        let notifier = ChangeNotifier::new(config.channel_capacity);
        let session = RwLock::new(Session::with_notifier(notifier.clone()));
        Self { config, notifier, session }
    }

    /// The configuration this monitor was built with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Register an observer for session events.
    pub fn subscribe(&self) -> EventStream {
        self.notifier.subscribe()
    }

    /// Snapshot of the live object set in insertion order.
    pub fn live_objects(&self) -> Vec<HeapObject> {
        self.session.read().expect("session lock poisoned").table().snapshot()
    }

    /// Counters of the session currently driving the table.
    pub fn stats(&self) -> SessionStats {
        self.session.read().expect("session lock poisoned").stats()
    }

    /// Bind the configured address and serve connections until an accept
    /// fails.
    pub async fn run(self: Arc<Self>) -> MonitorResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!("monitor listening on {}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Serve connections from an already-bound listener.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> MonitorResult<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            if let Err(err) = self.serve_connection(stream, peer).await {
                warn!(peer = %peer, error = %err, "connection ended with an error");
            }
        }
    }

    async fn serve_connection(
        &self,
        mut stream: TcpStream,
        peer: SocketAddr,
    ) -> MonitorResult<()> {
        info!(peer = %peer, "instrumented process connected");

        // Fresh session per connection; observers stay subscribed through
        // the shared notifier.
        *self.session.write().expect("session lock poisoned") =
            Session::with_notifier(self.notifier.clone());

        let outcome = self.pump(&mut stream, peer).await;

        let leaked = self.session.write().expect("session lock poisoned").finish();
        if leaked.is_empty() {
            info!(peer = %peer, "stream ended with a clean heap");
        } else {
            warn!(peer = %peer, leaked = leaked.len(), "stream ended with live objects");
        }
        outcome
    }

    async fn pump(&self, stream: &mut TcpStream, peer: SocketAddr) -> MonitorResult<()> {
        stream
            .write_all(self.config.handshake.to_line().as_bytes())
            .await?;
        debug!(peer = %peer, relay = self.config.handshake.server.as_deref(), "handshake sent");

        let mut buf = vec![0u8; self.config.read_buffer];
        loop {
            let read = stream.read(&mut buf).await?;
            if read == 0 {
                return Ok(());
            }
            let report = self
                .session
                .write()
                .expect("session lock poisoned")
                .receive(&buf[..read]);
            debug!(
                peer = %peer,
                bytes = read,
                applied = report.applied,
                errors = report.errors.len(),
                "chunk drained"
            );
        }
    }
}
