//! Tracks operations dispatched to an external executor until they are
//! acknowledged.
//!
//! Key properties:
//! - Ids are handed out in strictly increasing order.
//! - Iteration is in dispatch order.
//! - Cancellation marks an entry but keeps it until its acknowledgement
//!   arrives, so a late ack can be recognised and ignored instead of being
//!   reported as unknown.

use foundation::ids::CommandId;

#[derive(Debug, Clone, PartialEq)]
struct Entry<T> {
    id: CommandId,
    payload: T,
    canceled: bool,
}

/// Result of settling a pending operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled<T> {
    pub id: CommandId,
    pub payload: T,
    pub canceled: bool,
}

#[derive(Debug, Clone)]
pub struct PendingOps<T> {
    next_id: u64,
    items: Vec<Entry<T>>,
}

impl<T> Default for PendingOps<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
        }
    }
}

impl<T> PendingOps<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next id without tracking anything, for operations that
    /// need no acknowledgement.
    pub fn next_id(&mut self) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn submit(&mut self, payload: T) -> CommandId {
        let id = self.next_id();
        self.items.push(Entry {
            id,
            payload,
            canceled: false,
        });
        id
    }

    /// All outstanding entries, canceled ones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: CommandId) -> Option<&T> {
        self.items.iter().find(|e| e.id == id).map(|e| &e.payload)
    }

    /// Cancels every live entry matching `pred`; returns their ids in
    /// dispatch order.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<CommandId> {
        let mut out = Vec::new();
        for entry in self.items.iter_mut() {
            if !entry.canceled && pred(&entry.payload) {
                entry.canceled = true;
                out.push(entry.id);
            }
        }
        out
    }

    pub fn cancel_all(&mut self) -> Vec<CommandId> {
        self.cancel_where(|_| true)
    }

    /// Removes and returns the entry for `id`.
    pub fn settle(&mut self, id: CommandId) -> Option<Settled<T>> {
        let idx = self.items.iter().position(|e| e.id == id)?;
        let entry = self.items.remove(idx);
        Some(Settled {
            id: entry.id,
            payload: entry.payload,
            canceled: entry.canceled,
        })
    }

    /// Live (non-canceled) entries in dispatch order.
    pub fn live(&self) -> impl Iterator<Item = (CommandId, &T)> + '_ {
        self.items
            .iter()
            .filter(|e| !e.canceled)
            .map(|e| (e.id, &e.payload))
    }

    /// Drops everything, returning what was outstanding.
    pub fn clear(&mut self) -> Vec<Settled<T>> {
        std::mem::take(&mut self.items)
            .into_iter()
            .map(|e| Settled {
                id: e.id,
                payload: e.payload,
                canceled: e.canceled,
            })
            .collect()
    }
}
