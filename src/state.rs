//! The per-session ratchet state and its invariant checks.
//!
//! `State` is exclusively owned by one session; the caller must serialize
//! all mutating access. It derives `Serialize`/`Deserialize` for
//! encrypted-at-rest storage, following this codebase's convention for
//! session state — the concrete wire layout is out of scope here.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::config::{RatchetLimits, MAX_SKIP_CEILING};
use crate::error::{ErrKind, RatchetError};
use crate::skipped::SkippedStore;

/// New-session state has no DH material seeded yet; the handshake layer
/// (external to this core) fills `rk`, `dhs_priv`/`dhs_pub`/`dhr_pub`, and
/// the initial chain keys before the first send/recv step.
#[derive(Serialize, Deserialize)]
pub struct State {
    pub version: u16,

    pub(crate) rk: [u8; 32],

    pub dhs_priv: [u8; 32],
    pub dhs_pub: [u8; 32],
    pub dhr_pub: [u8; 32],

    pub(crate) cks: [u8; 32],
    pub(crate) ckr: [u8; 32],

    pub ns: u32,
    pub nr: u32,
    pub pn: u32,
    pub dh_ratchet_count: u32,

    pub(crate) skipped: SkippedStore,
    pub max_skip: u32,

    locked: bool,
    last_err: ErrKind,
}

impl Drop for State {
    fn drop(&mut self) {
        self.rk.zeroize();
        self.dhs_priv.zeroize();
        self.cks.zeroize();
        self.ckr.zeroize();
    }
}

impl State {
    /// Fresh "new-session" state: version 1, default bounds, empty skipped
    /// store, unlocked, no key material. Callers seed chain keys and DH
    /// material via the external handshake before stepping.
    pub fn new(limits: RatchetLimits) -> Self {
        Self {
            version: 1,
            rk: [0u8; 32],
            dhs_priv: [0u8; 32],
            dhs_pub: [0u8; 32],
            dhr_pub: [0u8; 32],
            cks: [0u8; 32],
            ckr: [0u8; 32],
            ns: 0,
            nr: 0,
            pn: 0,
            dh_ratchet_count: 0,
            skipped: SkippedStore::new(),
            max_skip: limits.max_skip,
            locked: false,
            last_err: ErrKind::None,
        }
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn last_err(&self) -> ErrKind {
        self.last_err
    }

    /// Seed the send chain key (used by the external handshake layer and
    /// by tests). Does not touch counters or lock state.
    pub fn set_send_chain_key(&mut self, cks: [u8; 32]) {
        self.cks = cks;
    }

    /// Seed the receive chain key (used by the external handshake layer and
    /// by tests). Does not touch counters or lock state.
    pub fn set_recv_chain_key(&mut self, ckr: [u8; 32]) {
        self.ckr = ckr;
    }

    /// Seed the root key (used by the external handshake layer, and by a
    /// DH-ratchet step outside this core after it derives a new `rk`).
    pub fn set_root_key(&mut self, rk: [u8; 32]) {
        self.rk = rk;
    }

    pub(crate) fn mark_ok(&mut self) {
        self.last_err = ErrKind::None;
    }

    pub(crate) fn mark_err(&mut self, err: &RatchetError) {
        self.last_err = err.kind();
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    /// Release a locked state. Only an external recovery procedure may call
    /// this, after it has independently re-established trust in the
    /// session (a fresh handshake, an operator override, etc.) — nothing in
    /// this core calls it itself.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Checked against at the entry of every sensitive operation. Freedom
    /// from permanent identifiers is a structural property of this type
    /// rather than something this runtime check needs to verify.
    pub fn validate(&self) -> Result<(), RatchetError> {
        if self.version == 0 {
            return Err(RatchetError::Invariant("version is 0 (uninitialized)".into()));
        }
        if self.max_skip == 0 || self.max_skip > MAX_SKIP_CEILING {
            return Err(RatchetError::Invariant(format!(
                "max_skip {} out of bounds (0, {}]",
                self.max_skip, MAX_SKIP_CEILING
            )));
        }
        Ok(())
    }

    /// Apply a policy-proposed tightening of `max_skip`. Monotone: the
    /// bound may only ever decrease, never widen back out.
    pub(crate) fn tighten_max_skip(&mut self, proposed: u32) {
        if proposed < self.max_skip {
            self.max_skip = proposed;
        }
    }
}
