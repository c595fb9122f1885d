use std::collections::HashMap;

use heapscope_proto::Command;

use crate::error::{TableError, TableResult};
use crate::object::{HeapObject, ObjectKey};

/// What applying one command did to the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// alloc: a new object entered the live set with one reference.
    Created,
    /// write: the object's contents were replaced.
    Updated,
    /// lift: the reference count after incrementing.
    Lifted { ref_count: u64 },
    /// drop that left the object live: the count after decrementing.
    Reduced { ref_count: u64 },
    /// drop that released the last reference; the object left the table.
    Removed,
    /// connect: the table is untouched; the flag is for the presentation
    /// layer.
    Connected { success: bool },
}

/// The live object set of one monitoring session.
///
/// Objects enter on `alloc` with one reference and leave when a `drop`
/// releases the last one. Iteration follows the insertion order of the
/// objects still live.
#[derive(Debug, Default)]
pub struct HeapObjectTable {
    objects: HashMap<ObjectKey, HeapObject>,
    // Insertion order of the keys in `objects`; kept in lockstep.
    order: Vec<ObjectKey>,
}

impl HeapObjectTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one decoded command, advancing the targeted object's lifecycle.
    ///
    /// A failed command leaves the table exactly as it was.
    pub fn apply(&mut self, command: Command) -> TableResult<ApplyOutcome> {
        match command {
            Command::Connect { success } => Ok(ApplyOutcome::Connected { success }),
            Command::Alloc { id, at, type_name, address } => {
                let key = ObjectKey::new(id, at);
                if self.objects.contains_key(&key) {
                    return Err(TableError::DuplicateAllocation { key });
                }
                let object =
                    HeapObject::allocated(key.id, key.locality.clone(), type_name, address);
                self.order.push(key.clone());
                self.objects.insert(key, object);
                Ok(ApplyOutcome::Created)
            }
            Command::Write { id, at, value } => {
                let key = ObjectKey::new(id, at);
                let object = self.live_mut(&key)?;
                object.value = value;
                Ok(ApplyOutcome::Updated)
            }
            Command::Lift { id, at } => {
                let key = ObjectKey::new(id, at);
                let object = self.live_mut(&key)?;
                object.ref_count += 1;
                Ok(ApplyOutcome::Lifted { ref_count: object.ref_count })
            }
            Command::Drop { id, at } => {
                let key = ObjectKey::new(id, at);
                let remaining = {
                    let object = self.live_mut(&key)?;
                    if object.ref_count == 0 {
                        return Err(TableError::RefcountUnderflow { key });
                    }
                    object.ref_count -= 1;
                    object.ref_count
                };
                if remaining == 0 {
                    self.objects.remove(&key);
                    self.order.retain(|live| live != &key);
                    Ok(ApplyOutcome::Removed)
                } else {
                    Ok(ApplyOutcome::Reduced { ref_count: remaining })
                }
            }
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if no object is live.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up a live object.
    pub fn get(&self, key: &ObjectKey) -> Option<&HeapObject> {
        self.objects.get(key)
    }

    /// Returns `true` if the key has a live object.
    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Live objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &HeapObject> + '_ {
        self.order.iter().filter_map(|key| self.objects.get(key))
    }

    /// Clone of the live set in insertion order.
    pub fn snapshot(&self) -> Vec<HeapObject> {
        self.iter().cloned().collect()
    }

    /// Sum of the reference counts across the live set.
    pub fn total_refs(&self) -> u64 {
        self.objects.values().map(|object| object.ref_count).sum()
    }

    /// Drop every tracked object, returning to the empty initial state.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.order.clear();
    }

    fn live_mut(&mut self, key: &ObjectKey) -> TableResult<&mut HeapObject> {
        match self.objects.get_mut(key) {
            Some(object) => Ok(object),
            None => Err(TableError::NotFound { key: key.clone() }),
        }
    }
}
