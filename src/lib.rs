//! ce-ratchet — policy-gated, forward-secret symmetric ratchet core
//!
//! # Design principles
//! - NO custom crypto; key derivation comes from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Every sensitive operation is authorized by an external `Policy` before
//!   any chain key advances.
//! - No silent state repair: an invariant violation, a desync, or a
//!   replayed key is reported, never papered over.
//!
//! # Module layout
//! - `state`      — the per-session `State` record and its invariants
//! - `ratchet`    — send/receive steps (the policy-gated chain-KDF machinery)
//! - `kdf`        — HKDF-SHA256 root/chain derivations
//! - `op_context` — canonical operation-context byte framing
//! - `policy`     — the `Policy` trait, `Decision`, and `MockPolicy`
//! - `skipped`    — the bounded skipped-message-key store
//! - `config`     — typed defaults/bounds (`RatchetLimits`)
//! - `error`      — the stable `ErrKind` taxonomy and `RatchetError`
//!
//! # Out of scope (external collaborators)
//! X25519 DH and the DH-ratchet step that rotates `rk` on epoch change, the
//! envelope format that produces `header_hash`/`aad_hash`, AEAD
//! encrypt/decrypt with the derived message key, and on-disk state
//! encoding all live outside this crate.

pub mod config;
pub mod error;
pub mod kdf;
pub mod op_context;
pub mod policy;
pub mod ratchet;
pub mod skipped;
pub mod state;

pub use config::RatchetLimits;
pub use error::{ErrKind, RatchetError};
pub use op_context::{build_op_context, OpCode};
pub use policy::{Decision, MockPolicy, Policy};
pub use ratchet::{step_recv_same_chain, step_send};
pub use state::State;
