use types::{Hash256, Slot};

pub fn root_key(root: &Hash256) -> [u8; 32] {
    root.to_fixed_bytes()
}

pub fn slot_key(slot: Slot) -> [u8; 8] {
    slot.as_u64().to_be_bytes()
}

pub fn index_key(index: u64) -> [u8; 8] {
    index.to_be_bytes()
}

pub const CHAIN_HEAD_KEY: &[u8] = b"chain_head";
pub const JUSTIFIED_BLOCK_KEY: &[u8] = b"justified_block";
pub const JUSTIFIED_STATE_KEY: &[u8] = b"justified_state";
pub const FINALIZED_BLOCK_KEY: &[u8] = b"finalized_block";
pub const FINALIZED_STATE_KEY: &[u8] = b"finalized_state";
pub const DEPOSIT_LOG_LEN_KEY: &[u8] = b"deposit_log_len";
