use crate::errors::BlockProcessingError;
use types::{BeaconState, ChainSpec, Checkpoint, Epoch, PendingAttestation};

fn matching_target_attestations<'a>(
    attestations: &'a [PendingAttestation],
    target_root: types::Hash256,
) -> impl Iterator<Item = &'a PendingAttestation> {
    attestations.iter().filter(move |a| a.data.target.root == target_root)
}

fn attesting_balance(state: &BeaconState, atts: &[&PendingAttestation], spec: &ChainSpec) -> u64 {
    let mut indices: Vec<usize> = vec![];
    for att in atts {
        if let Ok(committee) = state.get_beacon_committee(att.data.slot, att.data.shard, spec) {
            for (&validator_index, &set) in committee.iter().zip(att.aggregation_bits.iter()) {
                if set {
                    indices.push(validator_index);
                }
            }
        }
    }
    indices.sort_unstable();
    indices.dedup();
    state.get_total_balance(&indices, spec)
}

/// Step 1 of epoch processing: updates the justification bitfield and current/previous
/// justified checkpoints from aggregated attestation weight, then advances the finalized
/// checkpoint under the four standard justification-distance rules.
pub fn process_justification_and_finalization(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let current_epoch = state.current_epoch(spec);
    if current_epoch <= Epoch::new(1) {
        return Ok(());
    }

    let previous_epoch = state.previous_epoch(spec);
    let total_active_balance =
        state.get_total_balance(&state.get_active_validator_indices(current_epoch), spec);

    let previous_target_root = state
        .get_block_root(previous_epoch, spec)
        .unwrap_or_else(|_| state.finalized_checkpoint.root);
    let current_target_root = state
        .get_block_root(current_epoch, spec)
        .unwrap_or_else(|_| state.finalized_checkpoint.root);

    let previous_epoch_atts: Vec<&PendingAttestation> =
        matching_target_attestations(&state.previous_epoch_attestations, previous_target_root)
            .collect();
    let current_epoch_atts: Vec<&PendingAttestation> =
        matching_target_attestations(&state.current_epoch_attestations, current_target_root)
            .collect();

    let previous_balance = attesting_balance(state, &previous_epoch_atts, spec);
    let current_balance = attesting_balance(state, &current_epoch_atts, spec);

    let old_previous_justified = state.previous_justified_checkpoint;
    let old_current_justified = state.current_justified_checkpoint;

    state.previous_justified_checkpoint = state.current_justified_checkpoint;

    // Shift the justification bitfield left, dropping bit 3.
    for i in (1..4).rev() {
        state.justification_bits[i] = state.justification_bits[i - 1];
    }
    state.justification_bits[0] = false;

    if previous_balance.saturating_mul(3) >= total_active_balance.saturating_mul(2) {
        state.current_justified_checkpoint = Checkpoint::new(previous_epoch, previous_target_root);
        state.justification_bits[1] = true;
    }
    if current_balance.saturating_mul(3) >= total_active_balance.saturating_mul(2) {
        state.current_justified_checkpoint = Checkpoint::new(current_epoch, current_target_root);
        state.justification_bits[0] = true;
    }

    let bits = &state.justification_bits;

    // Rule 1: bits 1,2,3 set and old previous justified is 3 epochs back -> finalize it.
    if bits[1] && bits[2] && bits[3] && old_previous_justified.epoch + 3 == current_epoch {
        state.finalized_checkpoint = old_previous_justified;
    }
    // Rule 2: bits 1,2 set and old previous justified is 2 epochs back.
    if bits[1] && bits[2] && old_previous_justified.epoch + 2 == current_epoch {
        state.finalized_checkpoint = old_previous_justified;
    }
    // Rule 3: bits 0,1,2 set and old current justified is 2 epochs back.
    if bits[0] && bits[1] && bits[2] && old_current_justified.epoch + 2 == current_epoch {
        state.finalized_checkpoint = old_current_justified;
    }
    // Rule 4: bits 0,1 set and old current justified is 1 epoch back.
    if bits[0] && bits[1] && old_current_justified.epoch + 1 == current_epoch {
        state.finalized_checkpoint = old_current_justified;
    }

    Ok(())
}
