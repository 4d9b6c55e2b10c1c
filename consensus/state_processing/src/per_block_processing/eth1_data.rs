use types::{BeaconBlock, BeaconState, ChainSpec};

/// Records the proposer's eth1 vote and installs it as `state.eth1_data` immediately once it
/// commands a majority of the voting period, matching the reference client's early-adoption
/// behaviour rather than waiting for the epoch-boundary rotation in step 5 of epoch processing
/// (which only clears the vote queue once the period ends).
pub fn process_eth1_data(state: &mut BeaconState, block: &BeaconBlock, spec: &ChainSpec) {
    let vote = block.body.eth1_data.clone();
    state.eth1_data_votes.push(vote.clone());

    let period_slots = spec.epochs_per_eth1_voting_period * spec.slots_per_epoch;
    let vote_count = state
        .eth1_data_votes
        .iter()
        .filter(|v| **v == vote)
        .count() as u64;

    if vote_count * 2 > period_slots {
        state.eth1_data = vote;
    }
}
