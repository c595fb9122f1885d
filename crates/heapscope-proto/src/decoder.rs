use crate::command::Command;
use crate::error::{DecodeError, DecodeResult};

/// Incremental decoder for the newline-delimited JSON event stream.
///
/// Transport chunks carry no alignment guarantee: one record may arrive
/// split across several chunks and one chunk may carry several records. The
/// decoder buffers the trailing fragment between calls, so feeding the same
/// byte stream under any chunking yields the same sequence of results.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    /// Create a decoder with an empty fragment buffer.
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Feed one transport chunk and decode every record it completes.
    ///
    /// Results are ordered as the records appear on the wire. A segment that
    /// fails to decode yields its error in place; decoding resumes with the
    /// next segment.
    pub fn receive(&mut self, chunk: &[u8]) -> Vec<DecodeResult<Command>> {
        self.pending.extend_from_slice(chunk);

        let mut results = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.pending[consumed..].iter().position(|&b| b == b'\n') {
            let segment = &self.pending[consumed..consumed + offset];
            // Blank lines are not records; the emitter terminates every
            // record with exactly one newline.
            if !segment.iter().all(u8::is_ascii_whitespace) {
                results.push(decode_segment(segment));
            }
            consumed += offset + 1;
        }
        self.pending.drain(..consumed);
        results
    }

    /// Bytes buffered while waiting for a segment's terminating newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Discard any buffered fragment, returning to the initial state.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Decode one newline-free segment into a command.
///
/// Only a well-formed JSON object whose string `op` falls outside the known
/// set is a [`DecodeError::UnknownCommand`]; every other failure is a
/// [`DecodeError::Parse`].
pub fn decode_segment(segment: &[u8]) -> DecodeResult<Command> {
    let text = std::str::from_utf8(segment)
        .map_err(|err| DecodeError::Parse { reason: format!("invalid utf-8: {err}") })?;
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| DecodeError::Parse { reason: format!("invalid json: {err}") })?;
    if !value.is_object() {
        return Err(DecodeError::Parse { reason: "record is not a JSON object".into() });
    }
    let op = match value.get("op").and_then(serde_json::Value::as_str) {
        Some(op) => op,
        None => {
            return Err(DecodeError::Parse { reason: "missing or non-string op".into() });
        }
    };
    if !Command::KNOWN_OPS.iter().any(|known| *known == op) {
        return Err(DecodeError::UnknownCommand { op: op.to_owned() });
    }
    serde_json::from_value(value)
        .map_err(|err| DecodeError::Parse { reason: err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drop_record(id: u64) -> Command {
        Command::Drop { id, at: "n".into() }
    }

    // -----------------------------------------------------------------------
    // Segment classification
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_op_is_reported_as_unknown_command() {
        let err = decode_segment(br#"{"op": "gc", "id": 1}"#).unwrap_err();
        assert_eq!(err, DecodeError::UnknownCommand { op: "gc".into() });
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = decode_segment(b"{\"op\": \"drop\",").unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    #[test]
    fn non_object_record_is_a_parse_error() {
        let err = decode_segment(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    #[test]
    fn non_string_op_is_a_parse_error() {
        let err = decode_segment(br#"{"op": 5}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    #[test]
    fn known_op_with_missing_fields_is_a_parse_error() {
        let err = decode_segment(br#"{"op": "write", "id": 1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    #[test]
    fn negative_id_is_a_parse_error() {
        let err = decode_segment(br#"{"op": "drop", "id": -4, "at": "n"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = decode_segment(&[0xff, 0xfe, b'{', b'}']).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { .. }));
    }

    // -----------------------------------------------------------------------
    // Streaming
    // -----------------------------------------------------------------------

    #[test]
    fn decodes_a_complete_line() {
        let mut decoder = StreamDecoder::new();
        let results = decoder.receive(b"{\"op\": \"drop\", \"id\": 5, \"at\": \"n\"}\n");
        assert_eq!(results, vec![Ok(drop_record(5))]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn record_split_across_chunks_decodes_once_complete() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.receive(b"{\"op\": \"dro").is_empty());
        assert!(decoder.pending_len() > 0);

        let results = decoder.receive(b"p\", \"id\": 5, \"at\": \"n\"}\n");
        assert_eq!(results, vec![Ok(drop_record(5))]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn one_chunk_may_complete_several_records() {
        let mut decoder = StreamDecoder::new();
        let chunk = b"{\"op\": \"lift\", \"id\": 1, \"at\": \"n\"}\n{\"op\": \"drop\", \"id\": 1, \"at\": \"n\"}\n{\"op\": \"drop\", \"id\": 2, \"at\": \"n\"}";
        let results = decoder.receive(chunk);
        assert_eq!(
            results,
            vec![Ok(Command::Lift { id: 1, at: "n".into() }), Ok(drop_record(1))]
        );
        // The third record is still missing its newline.
        assert!(decoder.pending_len() > 0);

        assert_eq!(decoder.receive(b"\n"), vec![Ok(drop_record(2))]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn malformed_segment_does_not_poison_the_stream() {
        let mut decoder = StreamDecoder::new();
        let results = decoder.receive(b"garbage\n{\"op\": \"drop\", \"id\": 9, \"at\": \"n\"}\n");
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(DecodeError::Parse { .. })));
        assert_eq!(results[1], Ok(drop_record(9)));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut decoder = StreamDecoder::new();
        let results = decoder.receive(b"\n  \n{\"op\": \"drop\", \"id\": 2, \"at\": \"n\"}\n\n");
        assert_eq!(results, vec![Ok(drop_record(2))]);
    }

    #[test]
    fn utf8_split_at_a_chunk_boundary_still_decodes() {
        let line = "{\"op\": \"write\", \"id\": 1, \"at\": \"n\", \"value\": \"münze\"}\n";
        let bytes = line.as_bytes();
        // Cut inside the two-byte encoding of 'ü'.
        let cut = line.find('ü').unwrap() + 1;

        let mut decoder = StreamDecoder::new();
        assert!(decoder.receive(&bytes[..cut]).is_empty());
        let results = decoder.receive(&bytes[cut..]);
        assert_eq!(
            results,
            vec![Ok(Command::Write { id: 1, at: "n".into(), value: "münze".into() })]
        );
    }

    #[test]
    fn clear_discards_the_buffered_fragment() {
        let mut decoder = StreamDecoder::new();
        decoder.receive(b"{\"op\": \"drop\", \"id\":");
        decoder.clear();
        assert_eq!(decoder.pending_len(), 0);

        // The half record is gone; a fresh line decodes normally.
        let results = decoder.receive(b"{\"op\": \"drop\", \"id\": 3, \"at\": \"n\"}\n");
        assert_eq!(results, vec![Ok(drop_record(3))]);
    }

    #[test]
    fn clear_on_a_fresh_decoder_is_a_no_op() {
        let mut decoder = StreamDecoder::new();
        decoder.clear();
        decoder.clear();
        assert_eq!(decoder.pending_len(), 0);
    }

    // -----------------------------------------------------------------------
    // Chunking invariance
    // -----------------------------------------------------------------------

    fn any_line() -> impl Strategy<Value = String> {
        prop_oneof![
            (any::<u32>(), "[a-z]{1,6}").prop_map(|(id, at)| format!(
                r#"{{"op": "alloc", "id": {id}, "at": "{at}", "type": "int", "address": "0x0"}}"#
            )),
            (any::<u32>(), "[a-z]{1,6}").prop_map(|(id, at)| format!(
                r#"{{"op": "lift", "id": {id}, "at": "{at}"}}"#
            )),
            (any::<u32>(), "[a-z]{1,6}").prop_map(|(id, at)| format!(
                r#"{{"op": "drop", "id": {id}, "at": "{at}"}}"#
            )),
            Just(r#"{"op": "write", "id": 4, "at": "n", "value": "møøse"}"#.to_string()),
            Just(r#"{"op": "connect", "success": false}"#.to_string()),
            Just(r#"{"op": "gc", "generation": 2}"#.to_string()),
            Just(r#"{"op": "write", "id": 1}"#.to_string()),
            Just("not json at all".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn any_chunking_yields_the_same_results(
            lines in prop::collection::vec(any_line(), 1..10),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
        ) {
            let mut stream = Vec::new();
            for line in &lines {
                stream.extend_from_slice(line.as_bytes());
                stream.push(b'\n');
            }

            let mut whole = StreamDecoder::new();
            let expected = whole.receive(&stream);

            let mut offsets: Vec<usize> =
                cuts.iter().map(|ix| ix.index(stream.len() + 1)).collect();
            offsets.push(0);
            offsets.push(stream.len());
            offsets.sort_unstable();
            offsets.dedup();

            let mut chunked = StreamDecoder::new();
            let mut results = Vec::new();
            for window in offsets.windows(2) {
                results.extend(chunked.receive(&stream[window[0]..window[1]]));
            }

            prop_assert_eq!(results, expected);
            prop_assert_eq!(chunked.pending_len(), 0);
        }
    }
}
