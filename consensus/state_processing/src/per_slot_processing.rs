use crate::errors::BlockProcessingError;
use crate::per_epoch_processing::per_epoch_processing;
use tree_hash::TreeHash;
use types::{BeaconState, ChainSpec, Hash256, Slot};

/// Caches the pre-transition state and block roots into the bounded ring buffers, then
/// advances `state.slot` by one, running epoch processing whenever the new slot crosses an
/// epoch boundary. Mirrors §4.4's per-slot step (a)/(b).
fn cache_state(state: &mut BeaconState, spec: &ChainSpec) {
    let previous_state_root = Hash256::from_slice(&state.tree_hash_root()[..]);
    let index = (state.slot.as_u64() as usize) % spec.slots_per_historical_root;
    state.historical_state_roots[index] = previous_state_root;

    if state.latest_block_header.state_root == Hash256::zero() {
        state.latest_block_header.state_root = previous_state_root;
    }
    let previous_block_root = state.latest_block_header.canonical_root();
    state.historical_block_roots[index] = previous_block_root;
}

/// Advances `state` one slot at a time until `state.slot == target_slot`.
///
/// Fails with `SlotMonotonicity` if `target_slot < state.slot`; running zero slots (`target_slot
/// == state.slot`) is a no-op, not an error.
pub fn process_slots(
    state: &mut BeaconState,
    target_slot: Slot,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if target_slot < state.slot {
        return Err(BlockProcessingError::SlotMonotonicity {
            state_slot: state.slot.as_u64(),
            target_slot: target_slot.as_u64(),
        });
    }

    while state.slot < target_slot {
        cache_state(state, spec);

        let crosses_epoch_boundary =
            (state.slot.as_u64() + 1) % spec.slots_per_epoch == 0;
        if crosses_epoch_boundary {
            per_epoch_processing(state, spec)?;
        }

        state.slot += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Eth1Data;

    fn state_with(spec: &ChainSpec) -> BeaconState {
        BeaconState::genesis(0, Eth1Data::default(), vec![], vec![], spec)
    }

    #[test]
    fn rejects_non_monotone_target() {
        let spec = ChainSpec::minimal();
        let mut state = state_with(&spec);
        state.slot = Slot::new(5);
        let err = process_slots(&mut state, Slot::new(4), &spec).unwrap_err();
        assert_eq!(
            err,
            BlockProcessingError::SlotMonotonicity {
                state_slot: 5,
                target_slot: 4
            }
        );
    }

    #[test]
    fn no_op_when_already_at_target() {
        let spec = ChainSpec::minimal();
        let mut state = state_with(&spec);
        let before = state.clone();
        process_slots(&mut state, state.slot, &spec).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn advances_slot() {
        let spec = ChainSpec::minimal();
        let mut state = state_with(&spec);
        process_slots(&mut state, Slot::new(3), &spec).unwrap();
        assert_eq!(state.slot, Slot::new(3));
    }
}
