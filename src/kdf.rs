//! HKDF-SHA256 key derivation for the ratchet chains.
//!
//! Two derivations, both producing 64 bytes split into two 32-byte halves:
//! `derive_root` (root-key ratchet, salted by the current root key) and
//! `derive_chain` (symmetric chain step, unsalted). Labels are stable ASCII
//! and byte-exact — changing one is a breaking protocol change.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::RatchetError;

pub const RK_LABEL: &[u8] = b"ce.ratchet.rk.v1";
pub const MK_LABEL: &[u8] = b"ce.ratchet.mk.v1";

// Reserved for collaborators outside this core (header-key and
// associated-data binding); not derived here.
#[allow(dead_code)]
pub const CK_S_LABEL: &[u8] = b"ce.ratchet.ck_s.v1";
#[allow(dead_code)]
pub const CK_R_LABEL: &[u8] = b"ce.ratchet.ck_r.v1";
#[allow(dead_code)]
pub const H_LABEL: &[u8] = b"ce.ratchet.h.v1";
#[allow(dead_code)]
pub const AAD_LABEL: &[u8] = b"ce.ratchet.aad.v1";

fn expand_64(salt: Option<&[u8]>, ikm: &[u8], info: &[u8]) -> Result<([u8; 32], [u8; 32]), RatchetError> {
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    let mut out = [0u8; 64];
    hk.expand(info, &mut out)
        .map_err(|e| RatchetError::KeyDerivation(e.to_string()))?;
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    a.copy_from_slice(&out[..32]);
    b.copy_from_slice(&out[32..]);
    Ok((a, b))
}

/// `DeriveRoot(rk, dh) -> (rk', ck')`: `HKDF-Expand(salt=rk, ikm=dh, info=rk_label, L=64)`.
pub fn derive_root(rk: &[u8; 32], dh: &[u8]) -> Result<([u8; 32], [u8; 32]), RatchetError> {
    expand_64(Some(rk), dh, RK_LABEL)
}

/// `DeriveChain(ck) -> (ck_next, mk)`: `HKDF-Expand(salt=empty, ikm=ck, info=mk_label, L=64)`.
pub fn derive_chain(ck: &[u8; 32]) -> Result<([u8; 32], [u8; 32]), RatchetError> {
    expand_64(None, ck, MK_LABEL)
}
