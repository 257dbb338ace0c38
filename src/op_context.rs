//! Canonical operation-context byte framing.
//!
//! Every policy-gated step builds one of these before calling `Authorize`.
//! The layout is exact and big-endian throughout; changing it is a breaking
//! protocol change and requires bumping `OP_CTX_VERSION`.
//!
//! ```text
//! "CEOC"            4 bytes (magic)
//! op_ctx_version    u16  = 1
//! op                u16  (1=StepSend, 2=StepRecv, 3=DecryptMsg)
//! epoch             u32
//! ns                u32
//! nr                u32
//! header_hash       32 bytes
//! aad_hash          32 bytes
//! ```
//!
//! Total 82 bytes.

pub const MAGIC: &[u8; 4] = b"CEOC";
pub const OP_CTX_VERSION: u16 = 1;
pub const OP_CTX_LEN: usize = 4 + 2 + 2 + 4 + 4 + 4 + 32 + 32;

/// Stable op codes. `3` is reserved for the envelope layer and is never
/// built by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum OpCode {
    StepSend = 1,
    StepRecv = 2,
    #[allow(dead_code)]
    DecryptMsg = 3,
}

/// Build the canonical op-context bytes for a single step. Pure and
/// deterministic: identical arguments always produce identical bytes.
pub fn build_op_context(
    op: OpCode,
    epoch: u32,
    ns: u32,
    nr: u32,
    header_hash: &[u8; 32],
    aad_hash: &[u8; 32],
) -> [u8; OP_CTX_LEN] {
    let mut out = [0u8; OP_CTX_LEN];
    let mut pos = 0usize;

    out[pos..pos + 4].copy_from_slice(MAGIC);
    pos += 4;
    out[pos..pos + 2].copy_from_slice(&OP_CTX_VERSION.to_be_bytes());
    pos += 2;
    out[pos..pos + 2].copy_from_slice(&(op as u16).to_be_bytes());
    pos += 2;
    out[pos..pos + 4].copy_from_slice(&epoch.to_be_bytes());
    pos += 4;
    out[pos..pos + 4].copy_from_slice(&ns.to_be_bytes());
    pos += 4;
    out[pos..pos + 4].copy_from_slice(&nr.to_be_bytes());
    pos += 4;
    out[pos..pos + 32].copy_from_slice(header_hash);
    pos += 32;
    out[pos..pos + 32].copy_from_slice(aad_hash);
    pos += 32;

    debug_assert_eq!(pos, OP_CTX_LEN);
    out
}
