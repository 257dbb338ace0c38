//! Send and receive steps: the densest part of the core.
//!
//! Both steps follow the same shape: validate, check the lock, build an
//! op-context, apply the policy, then perform the chain-KDF advancement.
//! Every entry point sets `state.last_err` before returning, success or
//! failure, and emits a `tracing` event carrying only non-sensitive fields.

use tracing::{debug, warn};

use crate::error::RatchetError;
use crate::kdf;
use crate::op_context::{build_op_context, OpCode};
use crate::policy::{apply_decision, Applied, Policy};
use crate::state::State;

/// Authorize and perform one send-side chain step, returning the derived
/// message key.
pub fn step_send<P: Policy>(
    policy: &P,
    state: &mut State,
    header_hash: &[u8; 32],
    aad_hash: &[u8; 32],
) -> Result<[u8; 32], RatchetError> {
    let result = try_step_send(policy, state, header_hash, aad_hash);
    match &result {
        Ok(_) => {
            state.mark_ok();
            debug!(op = "step_send", ns = state.ns, epoch = state.dh_ratchet_count, "send step ok");
        }
        Err(e) => {
            state.mark_err(e);
            warn!(op = "step_send", kind = ?e.kind(), "send step failed");
        }
    }
    result
}

fn try_step_send<P: Policy>(
    policy: &P,
    state: &mut State,
    header_hash: &[u8; 32],
    aad_hash: &[u8; 32],
) -> Result<[u8; 32], RatchetError> {
    state.validate()?;
    if state.locked() {
        return Err(RatchetError::StateLocked);
    }

    let ctx = build_op_context(
        OpCode::StepSend,
        state.dh_ratchet_count,
        state.ns,
        state.nr,
        header_hash,
        aad_hash,
    );
    let decision = policy.authorize(OpCode::StepSend, &ctx);

    let mut tightened = None;
    match apply_decision(decision, |v| tightened = Some(v), || state.lock()) {
        Applied::Blocked(err) => {
            if let Some(v) = tightened {
                state.tighten_max_skip(v);
            }
            return Err(err);
        }
        Applied::Proceed => {
            if let Some(v) = tightened {
                state.tighten_max_skip(v);
            }
        }
    }

    let (ck_next, mk) = kdf::derive_chain(&state.cks)?;
    state.cks = ck_next;

    let next_ns = state
        .ns
        .checked_add(1)
        .ok_or_else(|| RatchetError::Desync("ns counter wrapped to zero".into()))?;
    state.ns = next_ns;

    Ok(mk)
}

/// Authorize and perform one receive-side chain step against the current
/// epoch's chain, returning the derived message key. Cross-epoch delivery
/// (`target_epoch != state.dh_ratchet_count`) is a `Desync`; the DH-ratchet
/// path that resolves an epoch change lives outside this core.
pub fn step_recv_same_chain<P: Policy>(
    policy: &P,
    state: &mut State,
    target_epoch: u32,
    target_n: u32,
    header_hash: &[u8; 32],
    aad_hash: &[u8; 32],
) -> Result<[u8; 32], RatchetError> {
    let result = try_step_recv(policy, state, target_epoch, target_n, header_hash, aad_hash);
    match &result {
        Ok(_) => {
            state.mark_ok();
            debug!(op = "step_recv", nr = state.nr, target_n, epoch = state.dh_ratchet_count, "recv step ok");
        }
        Err(e) => {
            state.mark_err(e);
            warn!(op = "step_recv", kind = ?e.kind(), target_n, "recv step failed");
        }
    }
    result
}

fn try_step_recv<P: Policy>(
    policy: &P,
    state: &mut State,
    target_epoch: u32,
    target_n: u32,
    header_hash: &[u8; 32],
    aad_hash: &[u8; 32],
) -> Result<[u8; 32], RatchetError> {
    state.validate()?;
    if state.locked() {
        return Err(RatchetError::StateLocked);
    }
    if target_epoch != state.dh_ratchet_count {
        return Err(RatchetError::Desync(format!(
            "target_epoch {target_epoch} != current epoch {}",
            state.dh_ratchet_count
        )));
    }

    let ctx = build_op_context(
        OpCode::StepRecv,
        state.dh_ratchet_count,
        state.ns,
        state.nr,
        header_hash,
        aad_hash,
    );
    let decision = policy.authorize(OpCode::StepRecv, &ctx);

    let mut tightened = None;
    match apply_decision(decision, |v| tightened = Some(v), || state.lock()) {
        Applied::Blocked(err) => {
            if let Some(v) = tightened {
                state.tighten_max_skip(v);
            }
            return Err(err);
        }
        Applied::Proceed => {
            if let Some(v) = tightened {
                state.tighten_max_skip(v);
            }
        }
    }

    let epoch = state.dh_ratchet_count;

    if target_n < state.nr {
        // Late delivery: must already be in the skipped store.
        return state.skipped.consume((epoch, target_n));
    }

    if target_n > state.nr {
        // Gap: derive and store each intervening key before falling
        // through to the in-order case. `ckr` has advanced for every
        // successfully stored entry even if a later `put` fails — the
        // caller must treat the session as desynchronized.
        for i in state.nr..target_n {
            let (ck_next, mk_skip) = kdf::derive_chain(&state.ckr)?;
            state.ckr = ck_next;
            state.skipped.put((epoch, i), mk_skip, state.max_skip)?;
        }
        state.nr = target_n;
    }

    let (ck_next, mk) = kdf::derive_chain(&state.ckr)?;
    state.ckr = ck_next;

    let next_nr = state
        .nr
        .checked_add(1)
        .ok_or_else(|| RatchetError::Desync("nr counter wrapped to zero".into()))?;
    state.nr = next_nr;

    Ok(mk)
}
