use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a tracked object.
///
/// Remote ids are only unique within one locality, so the key is the pair.
/// Two records with the same `id` but different `at` tags target different
/// objects.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub id: u64,
    pub locality: String,
}

impl ObjectKey {
    /// Create a key from a remote id and its locality tag.
    pub fn new(id: u64, locality: impl Into<String>) -> Self {
        Self { id, locality: locality.into() }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.locality)
    }
}

/// One live allocation on the remote heap.
///
/// `type_name`, `address`, and `value` are opaque to the monitor; they are
/// carried for display exactly as the emitter sent them. Serialized field
/// names mirror the wire records, so snapshots read like the stream that
/// produced them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapObject {
    /// Remote object id.
    pub id: u64,
    /// Locality tag the object lives at.
    #[serde(rename = "at")]
    pub locality: String,
    /// Source-level type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Remote address string.
    pub address: String,
    /// Serialized contents; empty until the first write lands.
    pub value: String,
    /// Number of live remote references.
    pub ref_count: u64,
}

impl HeapObject {
    /// A freshly allocated object: one reference, no contents yet.
    pub fn allocated(
        id: u64,
        locality: impl Into<String>,
        type_name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id,
            locality: locality.into(),
            type_name: type_name.into(),
            address: address.into(),
            value: String::new(),
            ref_count: 1,
        }
    }

    /// The key this object is tracked under.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.id, self.locality.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_displays_as_id_at_locality() {
        assert_eq!(ObjectKey::new(7, "node0").to_string(), "7@node0");
    }

    #[test]
    fn allocated_object_starts_with_one_reference_and_no_value() {
        let object = HeapObject::allocated(7, "node0", "int", "0x10");
        assert_eq!(object.ref_count, 1);
        assert_eq!(object.value, "");
        assert_eq!(object.key(), ObjectKey::new(7, "node0"));
    }

    #[test]
    fn serialized_fields_mirror_the_wire() {
        let object = HeapObject::allocated(3, "n", "char", "0xff");
        let value = serde_json::to_value(&object).unwrap();
        assert_eq!(value["at"], "n");
        assert_eq!(value["type"], "char");
        assert!(value.get("locality").is_none());
        assert!(value.get("type_name").is_none());
    }
}
