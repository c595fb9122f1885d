//! Wire protocol for the heapscope monitor.
//!
//! An instrumented process reports its remote-heap activity as a stream of
//! newline-delimited JSON records. This crate defines those records, the
//! incremental decoder that reassembles them from arbitrary transport
//! chunks, and the two single-line side protocols: the handshake options the
//! monitor sends to a freshly connected process, and the auth probe used to
//! validate a relay server.

pub mod command;
pub mod decoder;
pub mod error;
pub mod handshake;
pub mod probe;

pub use command::Command;
pub use decoder::{decode_segment, StreamDecoder};
pub use error::{DecodeError, DecodeResult};
pub use handshake::HandshakeOptions;
pub use probe::{parse_probe_verdict, secret_digest, ProbeRequest};
