use crate::errors::BlockProcessingError;
use crate::per_block_processing::{process_block, BlockSignatureStrategy};
use crate::per_slot_processing::process_slots;
use tree_hash::TreeHash;
use types::{BeaconBlock, BeaconState, ChainSpec, Hash256};

/// The only entry point used by the block applier: advances `state` to `block.slot`, then
/// applies `block`. A pure function of `(state, block, spec)` — no wall-clock or external
/// service is ever consulted.
pub fn execute(
    state: &mut BeaconState,
    block: &BeaconBlock,
    strategy: BlockSignatureStrategy,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    process_slots(state, block.slot, spec)?;
    process_block(state, block, strategy, spec)?;
    Ok(())
}

/// Runs `execute` on a defensive copy of `state` and returns the resulting `hash_tree_root`,
/// used by proposers to fill in a block's `state_root` before signing.
pub fn compute_state_root(
    state: &BeaconState,
    block: &BeaconBlock,
    spec: &ChainSpec,
) -> Result<Hash256, BlockProcessingError> {
    let mut working_copy = state.clone();
    execute(&mut working_copy, block, BlockSignatureStrategy::VerifyIndividual, spec)?;
    Ok(Hash256::from_slice(&working_copy.tree_hash_root()[..]))
}
