//! Stable error taxonomy for the ratchet core.
//!
//! `ErrKind` codes are fixed for test equality: callers compare on
//! `kind()`, never on the detail string. Every failing entry point writes
//! the returned kind into `state.last_err` before returning.

use thiserror::Error;

/// Stable u16 error codes. Values are part of the wire/introspection
/// contract — never renumber an existing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum ErrKind {
    None = 0,
    Invariant = 1,
    Replay = 2,
    Desync = 3,
    PolicyBlocked = 4,
    AadMismatch = 5,
    CiphertextInvalid = 6,
    StateLocked = 7,
    Unsupported = 8,
}

impl ErrKind {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Errors produced by any sensitive operation in this crate.
///
/// The detail string is for logs only; it must never be asserted on in
/// tests and must never contain key material.
#[derive(Debug, Error)]
pub enum RatchetError {
    #[error("state violates a precondition: {0}")]
    Invariant(String),

    #[error("replay or overflow in the skipped-key store: {0}")]
    Replay(String),

    #[error("counter overflow or epoch mismatch: {0}")]
    Desync(String),

    #[error("policy blocked the operation: {0}")]
    PolicyBlocked(String),

    #[error("associated-data mismatch (envelope layer)")]
    AadMismatch,

    #[error("ciphertext invalid (AEAD layer)")]
    CiphertextInvalid,

    #[error("state is locked pending external recovery")]
    StateLocked,

    #[error("unsupported feature: {0}")]
    Unsupported(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

impl RatchetError {
    /// Stable classification used for `state.last_err` and test assertions.
    pub fn kind(&self) -> ErrKind {
        match self {
            RatchetError::Invariant(_) => ErrKind::Invariant,
            RatchetError::Replay(_) => ErrKind::Replay,
            RatchetError::Desync(_) => ErrKind::Desync,
            RatchetError::PolicyBlocked(_) => ErrKind::PolicyBlocked,
            RatchetError::AadMismatch => ErrKind::AadMismatch,
            RatchetError::CiphertextInvalid => ErrKind::CiphertextInvalid,
            RatchetError::StateLocked => ErrKind::StateLocked,
            RatchetError::Unsupported(_) => ErrKind::Unsupported,
            RatchetError::KeyDerivation(_) => ErrKind::Invariant,
        }
    }
}
