use crate::per_block_processing::deposits::process_deposits_unchecked;
use types::{BeaconState, ChainSpec, Deposit, Eth1Data, Hash256};

/// Builds the genesis `BeaconState` from the sequence of deposits observed before the chain
/// started and the eth1 block hash that crossed the deposit threshold, as C9 hands off to C4
/// once the chain-start latch fires.
pub fn initialize_beacon_state_from_eth1(
    eth1_block_hash: Hash256,
    genesis_time: u64,
    deposits: Vec<Deposit>,
    spec: &ChainSpec,
) -> BeaconState {
    let eth1_data = Eth1Data {
        deposit_root: Hash256::zero(),
        deposit_count: deposits.len() as u64,
        block_hash: eth1_block_hash,
    };

    let mut state = BeaconState::genesis(genesis_time, eth1_data, vec![], vec![], spec);

    process_deposits_unchecked(&mut state, &deposits, spec);

    for index in 0..state.validators.len() {
        if state.validators[index].effective_balance >= spec.max_effective_balance {
            state.validators[index].activation_eligibility_epoch = types::Epoch::new(0);
            state.validators[index].activation_epoch = types::Epoch::new(0);
        }
    }

    state
}
