use serde::{Deserialize, Serialize};

/// All record kinds an instrumented process emits over the event stream.
///
/// Every record is one JSON object tagged by its `op` field. Fields beyond
/// the ones listed here are tolerated, so newer emitters can extend a record
/// without breaking older monitors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Command {
    /// Outcome of the emitter's own relay handshake, forwarded verbatim.
    Connect { success: bool },
    /// A new object came into existence on the remote heap.
    Alloc {
        id: u64,
        at: String,
        #[serde(rename = "type")]
        type_name: String,
        address: String,
    },
    /// The serialized contents of an object were replaced.
    Write { id: u64, at: String, value: String },
    /// One reference to an object was released.
    Drop { id: u64, at: String },
    /// One additional reference to an object was taken.
    Lift { id: u64, at: String },
}

impl Command {
    /// The `op` tags this monitor understands.
    pub const KNOWN_OPS: [&'static str; 5] = ["connect", "alloc", "write", "drop", "lift"];

    /// The `op` tag this command serializes under.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Alloc { .. } => "alloc",
            Self::Write { .. } => "write",
            Self::Drop { .. } => "drop",
            Self::Lift { .. } => "lift",
        }
    }

    /// Remote object id, for the record kinds that target an object.
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Connect { .. } => None,
            Self::Alloc { id, .. }
            | Self::Write { id, .. }
            | Self::Drop { id, .. }
            | Self::Lift { id, .. } => Some(*id),
        }
    }

    /// Locality tag, for the record kinds that carry one.
    pub fn locality(&self) -> Option<&str> {
        match self {
            Self::Connect { .. } => None,
            Self::Alloc { at, .. }
            | Self::Write { at, .. }
            | Self::Drop { at, .. }
            | Self::Lift { at, .. } => Some(at),
        }
    }
}
