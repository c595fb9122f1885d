use thiserror::Error;

use heapscope_proto::DecodeError;
use heapscope_table::TableError;

/// A per-record failure surfaced while draining a chunk.
///
/// Stream errors never abort the session; the offending record is skipped
/// and the drain continues with the next segment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors that terminate the monitor's transport loop.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
