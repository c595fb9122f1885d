//! Live object table for the heapscope monitor.
//!
//! Tracks every allocation an instrumented process reports, keyed by remote
//! id and locality, with reference counts advanced by the decoded command
//! stream. The table is the single source of truth the presentation layer
//! re-reads whenever the session signals a change.

pub mod error;
pub mod object;
pub mod table;

pub use error::{TableError, TableResult};
pub use object::{HeapObject, ObjectKey};
pub use table::{ApplyOutcome, HeapObjectTable};
