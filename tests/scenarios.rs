//! End-to-end scenarios against the public API only, mirroring the
//! two-party roundtrip style of this codebase's own ratchet tests
//! (`full_ratchet_roundtrip`, `out_of_order_messages`), generalized to the
//! policy-gated, epoch-explicit model this crate implements.

use ce_ratchet::{ErrKind, MockPolicy, RatchetLimits, State};

fn zero_hash() -> [u8; 32] {
    [0u8; 32]
}

/// Route this crate's `tracing` events to the test output. A library never
/// installs its own global subscriber (that's an application concern, per
/// this codebase's Tauri `lib.rs`); tests are the one place a subscriber
/// makes sense for making step failures legible.
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "ce_ratchet=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

#[test]
fn two_party_session_agrees_on_message_keys() {
    init_test_tracing();
    let mut alice = State::new(RatchetLimits::new(10));
    let mut bob = State::new(RatchetLimits::new(10));

    // Shared chain keys stand in for what the external handshake would
    // seed; alice's send chain is bob's receive chain and vice versa.
    let a_to_b = [11u8; 32];
    let b_to_a = [22u8; 32];
    alice.set_send_chain_key(a_to_b);
    bob.set_recv_chain_key(a_to_b);
    bob.set_send_chain_key(b_to_a);
    alice.set_recv_chain_key(b_to_a);

    let policy = MockPolicy::allow_all().with_max_skip(10);

    for n in 0..3u32 {
        let mk_alice = ce_ratchet::step_send(&policy, &mut alice, &zero_hash(), &zero_hash()).unwrap();
        let mk_bob =
            ce_ratchet::step_recv_same_chain(&policy, &mut bob, 0, n, &zero_hash(), &zero_hash()).unwrap();
        assert_eq!(mk_alice, mk_bob, "message {n}: keys must match");
    }
}

#[test]
fn out_of_order_delivery_then_replay_is_rejected() {
    let mut bob = State::new(RatchetLimits::new(10));
    bob.set_recv_chain_key([33u8; 32]);
    let policy = MockPolicy::allow_all().with_max_skip(10);

    // Messages 0 and 1 are skipped when message 2 arrives first.
    let mk2 = ce_ratchet::step_recv_same_chain(&policy, &mut bob, 0, 2, &zero_hash(), &zero_hash()).unwrap();
    assert_ne!(mk2, [0u8; 32]);
    assert_eq!(bob.nr, 3);

    let mk0 = ce_ratchet::step_recv_same_chain(&policy, &mut bob, 0, 0, &zero_hash(), &zero_hash()).unwrap();
    let mk1 = ce_ratchet::step_recv_same_chain(&policy, &mut bob, 0, 1, &zero_hash(), &zero_hash()).unwrap();
    assert_ne!(mk0, mk1);

    let err = ce_ratchet::step_recv_same_chain(&policy, &mut bob, 0, 0, &zero_hash(), &zero_hash()).unwrap_err();
    assert_eq!(err.kind(), ErrKind::Replay);
}

#[test]
fn policy_tightening_persists_across_calls() {
    let mut state = State::new(RatchetLimits::new(500));
    state.set_send_chain_key([1u8; 32]);

    let loose = MockPolicy::allow_all().with_max_skip(200);
    ce_ratchet::step_send(&loose, &mut state, &zero_hash(), &zero_hash()).unwrap();
    assert_eq!(state.max_skip, 200);

    // A later, looser proposal never widens the bound back out.
    let looser = MockPolicy::allow_all().with_max_skip(900);
    ce_ratchet::step_send(&looser, &mut state, &zero_hash(), &zero_hash()).unwrap();
    assert_eq!(state.max_skip, 200);

    let stricter = MockPolicy::allow_all().with_max_skip(50);
    ce_ratchet::step_send(&stricter, &mut state, &zero_hash(), &zero_hash()).unwrap();
    assert_eq!(state.max_skip, 50);
}

#[test]
fn forced_recovery_requires_external_reset() {
    let mut state = State::new(RatchetLimits::default());
    state.set_send_chain_key([7u8; 32]);

    let forcing = MockPolicy::allow_all().force_recovery();
    let err = ce_ratchet::step_send(&forcing, &mut state, &zero_hash(), &zero_hash()).unwrap_err();
    assert_eq!(err.kind(), ErrKind::PolicyBlocked);
    assert!(state.locked());
    assert_eq!(state.last_err(), ErrKind::PolicyBlocked);

    // Even a fully permissive policy cannot unstick a locked state — only
    // an external recovery procedure may do that.
    let permissive = MockPolicy::allow_all();
    let err2 = ce_ratchet::step_send(&permissive, &mut state, &zero_hash(), &zero_hash()).unwrap_err();
    assert_eq!(err2.kind(), ErrKind::StateLocked);
}
