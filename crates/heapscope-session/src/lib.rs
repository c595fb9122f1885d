//! Session layer for the heapscope monitor.
//!
//! Wires the stream decoder and the live object table into a session with
//! change notifications, runs the TCP listener that instrumented processes
//! dial into, and hosts the auth probe for relay servers.

pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod probe;
pub mod session;

pub use config::{MonitorConfig, DEFAULT_MONITOR_PORT};
pub use error::{MonitorError, MonitorResult, StreamError};
pub use monitor::Monitor;
pub use notify::{ChangeNotifier, EventStream, SessionEvent};
pub use probe::{probe_server, probe_server_with_deadline, PROBE_DEADLINE};
pub use session::{ChunkReport, Session, SessionStats};
