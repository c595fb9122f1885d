use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Auth line a probe sends to a relay server: the digests of the pre-shared
/// keys it wants validated. The relay answers with a single JSON boolean
/// line, `true` only if every digest is authorized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    pub auth: Vec<String>,
}

impl ProbeRequest {
    /// Request carrying the digest of one pre-shared key.
    pub fn for_secret(secret: &str) -> Self {
        Self { auth: vec![secret_digest(secret)] }
    }

    /// The single newline-terminated line sent on the wire.
    pub fn to_line(&self) -> String {
        let body =
            serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"auth":[]}"#));
        format!("{body}\n")
    }
}

/// Lowercase-hex MD5 digest of a pre-shared key, the form the relay's auth
/// table stores.
pub fn secret_digest(secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse the relay's one-line verdict. Anything other than the JSON
/// literals `true` and `false` is no verdict at all.
pub fn parse_probe_verdict(line: &str) -> Option<bool> {
    serde_json::from_str(line.trim()).ok()
}
