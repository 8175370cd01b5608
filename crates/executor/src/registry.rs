//! Handle registry
//!
//! Maps string tokens to native resource records. Records live in a
//! generation-tagged arena so a [`HandleId`] that outlived its entry is
//! rejected in O(1) instead of aliasing whatever reused the slot.
//!
//! | Operation | Absent token | Present token |
//! |-----------|--------------|---------------|
//! | `insert` | new id | `DuplicateToken`, resource handed back |
//! | `lookup` | `UnknownHandle` | id (kind must match) |
//! | `remove` | `None` | resource, slot generation bumped |

use keyhold_core::{Error, HandleId, HandleKind, Result};
use rustc_hash::FxHashMap;

/// Anything the registry can hold must know which kind of handle it is.
pub trait Kinded {
    /// Handle kind of this record.
    fn kind(&self) -> HandleKind;
}

/// An insert that was refused. The resource is returned so the caller can
/// release the native side.
#[derive(Debug)]
pub struct Rejected<R> {
    /// Why the insert failed
    pub error: Error,
    /// The resource that was not inserted
    pub resource: R,
}

#[derive(Debug)]
struct Entry<R> {
    token: String,
    resource: R,
}

#[derive(Debug)]
struct Slot<R> {
    generation: u32,
    entry: Option<Entry<R>>,
}

/// Per-session token → resource map.
#[derive(Debug)]
pub struct Registry<R> {
    slots: Vec<Slot<R>>,
    free: Vec<u32>,
    index: FxHashMap<String, HandleId>,
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<R: Kinded> Registry<R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resource` under `token`.
    pub fn insert(&mut self, token: String, resource: R) -> std::result::Result<HandleId, Rejected<R>> {
        if self.index.contains_key(&token) {
            return Err(Rejected {
                error: Error::DuplicateToken { token },
                resource,
            });
        }
        let entry = Some(Entry {
            token: token.clone(),
            resource,
        });
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = entry;
                HandleId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                HandleId::new(index, 0)
            }
        };
        self.index.insert(token, id);
        Ok(id)
    }

    /// Resolve `token`, optionally insisting on a kind.
    pub fn lookup(&self, token: &str, expected: Option<HandleKind>) -> Result<HandleId> {
        let unknown = || Error::unknown_handle(token, expected);
        let id = *self.index.get(token).ok_or_else(unknown)?;
        match (expected, self.get(id)) {
            (Some(kind), Some(r)) if r.kind() != kind => Err(unknown()),
            (_, Some(_)) => Ok(id),
            (_, None) => Err(unknown()),
        }
    }

    /// Kind of the record registered under `token`.
    pub fn kind_of(&self, token: &str) -> Option<HandleKind> {
        let id = self.index.get(token)?;
        self.get(*id).map(Kinded::kind)
    }

    /// True if `token` is registered.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    fn entry(&self, id: HandleId) -> Option<&Entry<R>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    /// Record for `id`, or `None` if the id is stale.
    pub fn get(&self, id: HandleId) -> Option<&R> {
        self.entry(id).map(|e| &e.resource)
    }

    /// Mutable record for `id`, or `None` if the id is stale.
    pub fn get_mut(&mut self, id: HandleId) -> Option<&mut R> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut().map(|e| &mut e.resource)
    }

    /// Token registered for `id`.
    #[cfg(test)]
    pub fn token(&self, id: HandleId) -> Option<&str> {
        self.entry(id).map(|e| e.token.as_str())
    }

    /// Unregister `token`. Removing an absent token is a no-op.
    pub fn remove(&mut self, token: &str) -> Option<R> {
        let id = self.index.remove(token)?;
        let slot = self.slots.get_mut(id.index as usize)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(entry.resource)
    }

    /// Live tokens with their kinds, in slot order.
    pub fn tokens(&self) -> impl Iterator<Item = (&str, HandleKind)> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.entry.as_ref())
            .map(|e| (e.token.as_str(), e.resource.kind()))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
