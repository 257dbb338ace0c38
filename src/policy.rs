//! The policy adapter interface and a deterministic mock used by this
//! crate's own tests and by downstream integration tests.
//!
//! `Authorize` is required to be pure: same `(op, op_context)` in, same
//! `Decision` out. The core never retries or second-guesses a decision —
//! it applies the ordering in `apply_decision` exactly once per step.

use crate::error::RatchetError;
use crate::op_context::OpCode;

/// Returned by `Policy::authorize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allow: bool,
    pub force_recovery: bool,
    /// `0` means "no tightening"; otherwise the policy's proposed new
    /// `max_skip`, which may only ever reduce the state's current bound.
    pub max_skip: u32,
    pub reason_code: u32,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allow: true,
            force_recovery: false,
            max_skip: 0,
            reason_code: 0,
        }
    }

    pub fn deny(reason_code: u32) -> Self {
        Self {
            allow: false,
            force_recovery: false,
            max_skip: 0,
            reason_code,
        }
    }
}

/// External policy oracle. The core treats any `Err` from `authorize` as
/// `PolicyBlocked`, identically to an explicit deny.
pub trait Policy {
    fn authorize(&self, op: OpCode, op_context: &[u8]) -> Result<Decision, RatchetError>;
}

/// Outcome of applying a `Decision` to a state, before the caller performs
/// the actual chain-KDF advancement.
pub enum Applied {
    Proceed,
    Blocked(RatchetError),
}

/// Apply a policy decision in a fixed order: a policy error or a forced
/// recovery blocks outright (locking the state on forced recovery); a
/// tightened bound is then applied regardless of the allow/deny outcome,
/// so policy bounds ratchet down monotonically even on a deny.
pub fn apply_decision<F: FnMut(u32)>(
    result: Result<Decision, RatchetError>,
    mut tighten: F,
    mut lock: impl FnMut(),
) -> Applied {
    let decision = match result {
        Err(_) => return Applied::Blocked(RatchetError::PolicyBlocked("policy adapter errored".into())),
        Ok(d) => d,
    };

    if decision.force_recovery {
        lock();
        return Applied::Blocked(RatchetError::PolicyBlocked("policy forced recovery".into()));
    }

    if decision.max_skip != 0 {
        tighten(decision.max_skip);
    }

    if !decision.allow {
        return Applied::Blocked(RatchetError::PolicyBlocked(format!(
            "policy denied (reason_code={})",
            decision.reason_code
        )));
    }

    Applied::Proceed
}

/// Deterministic, in-memory `Policy` for tests. Construct with the builder
/// methods; every call to `authorize` returns the same fixed `Decision`.
#[derive(Debug, Clone, Copy)]
pub struct MockPolicy {
    decision: Decision,
}

impl MockPolicy {
    pub fn allow_all() -> Self {
        Self {
            decision: Decision::allow(),
        }
    }

    pub fn deny(reason_code: u32) -> Self {
        Self {
            decision: Decision::deny(reason_code),
        }
    }

    pub fn with_max_skip(mut self, max_skip: u32) -> Self {
        self.decision.max_skip = max_skip;
        self
    }

    pub fn force_recovery(mut self) -> Self {
        self.decision.force_recovery = true;
        self
    }
}

impl Policy for MockPolicy {
    fn authorize(&self, _op: OpCode, _op_context: &[u8]) -> Result<Decision, RatchetError> {
        Ok(self.decision)
    }
}
