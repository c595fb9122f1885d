use serde::{Deserialize, Serialize};

/// Options line the monitor sends as soon as an instrumented process
/// connects, before the first event record is expected.
///
/// Both fields are optional and omitted when unset; a monitor with nothing
/// to configure sends the empty object `{}`. An emitter that receives
/// `server` and `psk` establishes its own relay connection and reports the
/// outcome with a `connect` record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeOptions {
    /// Relay endpoint the emitter should connect to, as `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Pre-shared key for the relay's auth exchange.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psk: Option<String>,
}

impl HandshakeOptions {
    /// Options that direct the emitter at a relay server.
    pub fn relay(server: impl Into<String>, psk: impl Into<String>) -> Self {
        Self { server: Some(server.into()), psk: Some(psk.into()) }
    }

    /// Returns `true` when no option is set and the line is just `{}`.
    pub fn is_empty(&self) -> bool {
        self.server.is_none() && self.psk.is_none()
    }

    /// The single newline-terminated line sent on the wire.
    pub fn to_line(&self) -> String {
        let body = serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"));
        format!("{body}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_serialize_as_empty_object() {
        let options = HandshakeOptions::default();
        assert!(options.is_empty());
        assert_eq!(options.to_line(), "{}\n");
    }

    #[test]
    fn relay_options_carry_server_and_psk() {
        let options = HandshakeOptions::relay("relay.example:8000", "hunter2");
        assert!(!options.is_empty());

        let line = options.to_line();
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["server"], "relay.example:8000");
        assert_eq!(value["psk"], "hunter2");
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let options: HandshakeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, HandshakeOptions::default());

        let options: HandshakeOptions =
            serde_json::from_str(r#"{"server": "relay:1"}"#).unwrap();
        assert_eq!(options.server.as_deref(), Some("relay:1"));
        assert_eq!(options.psk, None);
    }
}
