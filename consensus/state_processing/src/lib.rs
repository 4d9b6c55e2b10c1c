//! Deterministic state-transition pipeline: slot-by-slot advance, per-block operation
//! processing, and epoch-boundary finality/reward accounting.

pub mod common;
pub mod errors;
mod execute;
mod genesis;
pub mod per_block_processing;
mod per_epoch_processing;
mod per_slot_processing;

pub use errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
pub use execute::{compute_state_root, execute};
pub use genesis::initialize_beacon_state_from_eth1;
pub use per_block_processing::{process_block, BlockSignatureStrategy};
pub use per_slot_processing::process_slots;

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BeaconBlock, ChainSpec, Epoch, Eth1Data, Slot, Validator};

    fn genesis_with_one_validator(spec: &ChainSpec) -> types::BeaconState {
        let validator = Validator {
            pubkey: Default::default(),
            withdrawal_credentials: types::Hash256::zero(),
            effective_balance: spec.max_effective_balance,
            slashed: false,
            activation_eligibility_epoch: Epoch::new(0),
            activation_epoch: Epoch::new(0),
            exit_epoch: spec.far_future_epoch,
            withdrawable_epoch: spec.far_future_epoch,
        };
        types::BeaconState::genesis(
            0,
            Eth1Data::default(),
            vec![validator],
            vec![spec.max_effective_balance],
            spec,
        )
    }

    #[test]
    fn execute_advances_slot_and_preserves_registry_invariant() {
        let spec = ChainSpec::minimal();
        let mut state = genesis_with_one_validator(&spec);

        let mut block = BeaconBlock::empty();
        block.slot = Slot::new(1);
        block.parent_root = state.latest_block_header.canonical_root();

        execute(&mut state, &block, BlockSignatureStrategy::BlockVerified, &spec).unwrap();

        assert_eq!(state.slot, block.slot);
        assert_eq!(state.validators.len(), state.balances.len());
    }

    #[test]
    fn execute_rejects_non_monotone_slot() {
        let spec = ChainSpec::minimal();
        let mut state = genesis_with_one_validator(&spec);
        state.slot = Slot::new(5);

        let mut block = BeaconBlock::empty();
        block.slot = Slot::new(2);

        let err = execute(&mut state, &block, BlockSignatureStrategy::BlockVerified, &spec)
            .unwrap_err();
        assert!(matches!(err, BlockProcessingError::SlotMonotonicity { .. }));
    }
}
