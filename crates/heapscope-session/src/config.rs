use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use heapscope_proto::HandshakeOptions;

use crate::notify::DEFAULT_CHANNEL_CAPACITY;

/// Port instrumented processes dial by convention.
pub const DEFAULT_MONITOR_PORT: u16 = 39999;

/// Configuration for the monitor listener.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Address the monitor accepts instrumented processes on.
    pub bind_addr: SocketAddr,
    /// Options line sent to every process right after it connects.
    pub handshake: HandshakeOptions,
    /// Capacity of the observer broadcast channel.
    pub channel_capacity: usize,
    /// Size of the transport read buffer in bytes.
    pub read_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_MONITOR_PORT)),
            handshake: HandshakeOptions::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            read_buffer: 8 * 1024,
        }
    }
}
