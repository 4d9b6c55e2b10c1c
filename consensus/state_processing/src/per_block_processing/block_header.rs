use crate::errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
use types::{BeaconBlock, BeaconState, ChainSpec};

/// Verifies `block` is the direct, correctly-numbered child of `state`'s last processed header,
/// then overwrites `state.latest_block_header` with the new unsealed header (`state_root`
/// zeroed until `compute_state_root` fills it in on the next slot).
pub fn process_block_header(
    state: &mut BeaconState,
    block: &BeaconBlock,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if block.slot != state.slot {
        return Err(BlockProcessingError::OperationInvalid {
            kind: OperationKind::BlockHeader,
            index: 0,
            cause: OperationInvalidCause::BadHeader,
        });
    }

    let expected_parent_root = state.latest_block_header.canonical_root();
    if block.parent_root != expected_parent_root {
        return Err(BlockProcessingError::OperationInvalid {
            kind: OperationKind::BlockHeader,
            index: 0,
            cause: OperationInvalidCause::BadHeader,
        });
    }

    let proposer_index = state
        .get_beacon_proposer_index(block.slot, spec)
        .map_err(|_| BlockProcessingError::InvariantViolation("no active proposer"))?;
    if state.validators[proposer_index].slashed {
        return Err(BlockProcessingError::OperationInvalid {
            kind: OperationKind::BlockHeader,
            index: proposer_index,
            cause: OperationInvalidCause::AlreadySlashed,
        });
    }

    state.latest_block_header = types::BeaconBlockHeader {
        slot: block.slot,
        parent_root: block.parent_root,
        state_root: types::Hash256::zero(),
        body_root: block.body_root(),
    };

    Ok(())
}
