//! Typed defaults and bounds for the skipped-key store.
//!
//! Mirrors this codebase's convention of environment-variable overrides for
//! deployment-time knobs (e.g. the Tauri app layer's `DL_IDS_URL`): a
//! convenience constructor only. The policy's runtime tightening is the
//! authoritative bound once a session is live.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_SKIP: u32 = 2000;
pub const MAX_SKIP_CEILING: u32 = 1_000_000;

const MAX_SKIP_ENV_VAR: &str = "CE_RATCHET_MAX_SKIP";

/// Bounds passed to `State::new` and honored by the policy's monotone
/// tightening rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatchetLimits {
    pub max_skip: u32,
}

impl Default for RatchetLimits {
    fn default() -> Self {
        Self {
            max_skip: DEFAULT_MAX_SKIP,
        }
    }
}

impl RatchetLimits {
    pub fn new(max_skip: u32) -> Self {
        Self {
            max_skip: max_skip.min(MAX_SKIP_CEILING),
        }
    }

    /// Reads `CE_RATCHET_MAX_SKIP`, falling back to `DEFAULT_MAX_SKIP` when
    /// unset or unparsable. Always clamped to `MAX_SKIP_CEILING`.
    pub fn from_env() -> Self {
        let max_skip = std::env::var(MAX_SKIP_ENV_VAR)
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_SKIP);
        Self::new(max_skip)
    }
}
