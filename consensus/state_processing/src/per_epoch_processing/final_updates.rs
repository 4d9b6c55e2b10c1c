use types::{BeaconState, ChainSpec};

/// Steps 5 and 6 of epoch processing: rotates the ETH1 data-vote queue once its voting period
/// has elapsed, and resets the pending-attestation buffers (`current` becomes next epoch's
/// `previous`, and `current` starts empty).
pub fn process_final_updates(state: &mut BeaconState, spec: &ChainSpec) {
    let next_epoch = state.current_epoch(spec) + 1;

    if next_epoch.as_u64() % spec.epochs_per_eth1_voting_period == 0 {
        state.eth1_data_votes.clear();
    }

    state.previous_epoch_attestations = std::mem::take(&mut state.current_epoch_attestations);
}
