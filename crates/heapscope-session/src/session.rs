use tracing::{debug, warn};

use heapscope_proto::{DecodeError, StreamDecoder};
use heapscope_table::{ApplyOutcome, HeapObject, HeapObjectTable};

use crate::error::StreamError;
use crate::notify::{ChangeNotifier, EventStream, SessionEvent};

/// Counters accumulated over the lifetime of one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Transport chunks fed into the decoder.
    pub chunks: u64,
    /// Records successfully decoded into commands.
    pub commands: u64,
    /// Commands the table accepted.
    pub applied: u64,
    /// Segments rejected as malformed.
    pub parse_errors: u64,
    /// Well-formed records with an unrecognized op.
    pub unknown_commands: u64,
    /// Commands the table rejected.
    pub rejected: u64,
}

/// What one chunk left behind: how many commands landed in the table and
/// which records failed, in stream order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub applied: usize,
    pub errors: Vec<StreamError>,
}

/// One monitoring session: the decoder, the object table, and the notifier
/// wired together for a single transport connection.
///
/// Processing is strictly sequential. Each chunk is fully drained into the
/// table before the next is accepted, and observers are signalled exactly
/// once per chunk, however many records it completed.
#[derive(Debug)]
pub struct Session {
    decoder: StreamDecoder,
    table: HeapObjectTable,
    notifier: ChangeNotifier,
    stats: SessionStats,
}

impl Session {
    /// Session with its own notifier at the default capacity.
    pub fn new() -> Self {
        Self::with_notifier(ChangeNotifier::default())
    }

    /// Session publishing through an existing notifier, so observers keep
    /// their subscriptions across consecutive transport connections.
    pub fn with_notifier(notifier: ChangeNotifier) -> Self {
        Self {
            decoder: StreamDecoder::new(),
            table: HeapObjectTable::new(),
            notifier,
            stats: SessionStats::default(),
        }
    }

    /// Feed one transport chunk: decode every record it completes, advance
    /// the table in stream order, then signal observers once.
    ///
    /// Failed records are returned in the [`ChunkReport`] and skipped; they
    /// never stop the drain.
    pub fn receive(&mut self, chunk: &[u8]) -> ChunkReport {
        self.stats.chunks += 1;

        let mut report = ChunkReport::default();
        for decoded in self.decoder.receive(chunk) {
            match decoded {
                Ok(command) => {
                    self.stats.commands += 1;
                    match self.table.apply(command) {
                        Ok(ApplyOutcome::Connected { success }) => {
                            self.stats.applied += 1;
                            report.applied += 1;
                            self.notifier.fire(SessionEvent::Connected { success });
                        }
                        Ok(_) => {
                            self.stats.applied += 1;
                            report.applied += 1;
                        }
                        Err(err) => {
                            self.stats.rejected += 1;
                            warn!(error = %err, "command rejected by the object table");
                            report.errors.push(StreamError::Table(err));
                        }
                    }
                }
                Err(err @ DecodeError::UnknownCommand { .. }) => {
                    self.stats.unknown_commands += 1;
                    debug!(error = %err, "skipping unknown command");
                    report.errors.push(StreamError::Decode(err));
                }
                Err(err) => {
                    self.stats.parse_errors += 1;
                    warn!(error = %err, "skipping malformed record");
                    report.errors.push(StreamError::Decode(err));
                }
            }
        }

        self.notifier.fire(SessionEvent::Refreshed);
        report
    }

    /// End the session: return the objects still live as the leak report,
    /// reset the decoder and table, and signal observers.
    pub fn finish(&mut self) -> Vec<HeapObject> {
        let leaked = self.table.snapshot();
        self.clear();
        self.notifier.fire(SessionEvent::Closed { leaked: leaked.len() });
        leaked
    }

    /// Reset the decoder and table to their empty initial state. Safe to
    /// call at any time, including on an already-empty session.
    pub fn clear(&mut self) {
        self.decoder.clear();
        self.table.clear();
    }

    /// The live object table.
    pub fn table(&self) -> &HeapObjectTable {
        &self.table
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Register an observer for this session's events.
    pub fn subscribe(&self) -> EventStream {
        self.notifier.subscribe()
    }

    /// The notifier this session publishes through.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
