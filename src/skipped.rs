//! Bounded skipped-key store.
//!
//! Maps `(epoch, nr)` to a one-shot message-key record. Insertion is
//! idempotent on byte-identical re-derivation, but refuses a mismatched
//! re-insert as an `Invariant` violation. `consume` succeeds exactly once
//! per key; everything else is a `Replay`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::RatchetError;

pub type SkipKey = (u32, u32);

/// A single derived-in-advance message key. `mk` never changes after
/// insertion; `used` flips from `false` to `true` exactly once.
#[derive(Clone, Serialize, Deserialize)]
pub struct MsgKeyRecord {
    pub mk: [u8; 32],
    pub used: bool,
}

impl Drop for MsgKeyRecord {
    fn drop(&mut self) {
        self.mk.zeroize();
    }
}

/// Constant-time comparison, used when checking whether a re-derived key
/// matches the one already stored under the same `(epoch, nr)`.
fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[derive(Default, Serialize, Deserialize)]
pub struct SkippedStore {
    entries: HashMap<SkipKey, MsgKeyRecord>,
}

impl SkippedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a freshly derived skipped key, bounded by `max_skip`.
    ///
    /// Idempotent when the key is already present and `mk` matches
    /// byte-for-byte; `Invariant` when it differs; `Replay` ("overflow")
    /// when the store is already at capacity.
    pub fn put(&mut self, key: SkipKey, mk: [u8; 32], max_skip: u32) -> Result<(), RatchetError> {
        if let Some(existing) = self.entries.get(&key) {
            return if constant_time_eq(&existing.mk, &mk) {
                Ok(())
            } else {
                Err(RatchetError::Invariant(format!(
                    "re-derivation of skipped key {key:?} does not match stored value"
                )))
            };
        }
        if self.entries.len() >= max_skip as usize {
            return Err(RatchetError::Replay(format!(
                "skipped-key store overflow at {max_skip} entries"
            )));
        }
        self.entries.insert(key, MsgKeyRecord { mk, used: false });
        Ok(())
    }

    /// Consume a stored key exactly once. Second call on the same key, or a
    /// call on a key that was never stored, is a `Replay`.
    pub fn consume(&mut self, key: SkipKey) -> Result<[u8; 32], RatchetError> {
        match self.entries.get_mut(&key) {
            None => Err(RatchetError::Replay(format!("unknown skipped key {key:?}"))),
            Some(record) if record.used => {
                Err(RatchetError::Replay(format!("used key {key:?} replayed")))
            }
            Some(record) => {
                record.used = true;
                Ok(record.mk)
            }
        }
    }

    /// Advisory pruning: remove `used = true` records first, then the
    /// oldest remaining entries by `(epoch, nr)` lexicographic order, until
    /// at most `target_len` entries remain. Never evicts a key the caller
    /// has not already authorized losing.
    pub fn prune_to(&mut self, target_len: usize) {
        if self.entries.len() <= target_len {
            return;
        }

        let mut used_keys: Vec<SkipKey> = self
            .entries
            .iter()
            .filter(|(_, r)| r.used)
            .map(|(k, _)| *k)
            .collect();
        used_keys.sort();
        for key in used_keys {
            if self.entries.len() <= target_len {
                return;
            }
            self.entries.remove(&key);
        }

        let mut remaining: Vec<SkipKey> = self.entries.keys().copied().collect();
        remaining.sort();
        for key in remaining {
            if self.entries.len() <= target_len {
                return;
            }
            self.entries.remove(&key);
        }
    }
}
