use thiserror::Error;

/// Failure modes for a single stream segment.
///
/// Errors are scoped to one newline-delimited segment; the decoder
/// resynchronizes at the next newline and later segments are unaffected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The segment was not a well-formed record: invalid UTF-8, invalid
    /// JSON, not a JSON object, a missing or non-string `op`, or a known
    /// `op` whose required fields are absent or ill-typed.
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// A well-formed record whose `op` is outside the known set. Newer
    /// emitters may send these; callers should report and skip them.
    #[error("unknown command op {op:?}")]
    UnknownCommand { op: String },
}

pub type DecodeResult<T> = Result<T, DecodeError>;
