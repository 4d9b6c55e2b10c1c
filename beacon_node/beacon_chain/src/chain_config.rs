use serde_derive::{Deserialize, Serialize};

/// There is a long skip on testnets that have stalled for a period; default high enough to
/// import through one without raising `InvariantViolation` on ordinary network jitter.
pub const DEFAULT_IMPORT_MAX_SKIP_SLOTS: u64 = 700;

#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    /// Maximum number of slots `process_block` will advance through via `process_slots` before
    /// refusing a block outright. `None` disables the limit.
    pub import_max_skip_slots: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            import_max_skip_slots: Some(DEFAULT_IMPORT_MAX_SKIP_SLOTS),
        }
    }
}
