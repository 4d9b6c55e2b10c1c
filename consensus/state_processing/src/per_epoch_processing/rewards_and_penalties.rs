use std::collections::HashMap;
use types::{BeaconState, ChainSpec, Epoch};

fn base_reward(effective_balance: u64, total_active_balance: u64, spec: &ChainSpec) -> u64 {
    if total_active_balance == 0 {
        return 0;
    }
    let sqrt_balance = integer_sqrt(total_active_balance);
    if sqrt_balance == 0 {
        return 0;
    }
    effective_balance / spec.base_reward_quotient / sqrt_balance
}

fn integer_sqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[derive(Default, Clone, Copy)]
struct ValidatorEpochRecord {
    participated: bool,
    voted_target: bool,
    min_inclusion_delay: Option<u64>,
}

/// Step 2 of epoch processing: applies the inclusion-distance, FFG target, and inactivity-leak
/// rewards/penalties of §4.4 to every active validator's balance.
///
/// This is a simplified accounting pass relative to the reference client's exact crosslink
/// committee bookkeeping: it derives "did validator i attest correctly" straight from the
/// pending-attestation bitfields against the previous epoch's committee shuffle, which is
/// equivalent for any epoch in which the active set has not mutated mid-epoch.
pub fn process_rewards_and_penalties(state: &mut BeaconState, spec: &ChainSpec) {
    let current_epoch = state.current_epoch(spec);
    if current_epoch == Epoch::new(0) {
        return;
    }
    let previous_epoch = state.previous_epoch(spec);

    let total_active_balance =
        state.get_total_balance(&state.get_active_validator_indices(current_epoch), spec);
    let in_inactivity_leak =
        state.finalized_checkpoint.epoch.as_u64() + spec.min_epochs_to_inactivity_penalty
            < current_epoch.as_u64();

    let previous_target_root = state
        .get_block_root(previous_epoch, spec)
        .unwrap_or_else(|_| state.finalized_checkpoint.root);

    let eligible_indices = state.get_active_validator_indices(previous_epoch);

    let mut records: HashMap<usize, ValidatorEpochRecord> = HashMap::new();
    for att in &state.previous_epoch_attestations {
        let committee = state
            .get_beacon_committee(att.data.slot, att.data.shard, spec)
            .unwrap_or_default();
        let voted_target = att.data.target.root == previous_target_root;
        for (&validator_index, &set) in committee.iter().zip(att.aggregation_bits.iter()) {
            if !set {
                continue;
            }
            let record = records.entry(validator_index).or_default();
            record.participated = true;
            record.voted_target |= voted_target;
            record.min_inclusion_delay = Some(
                record
                    .min_inclusion_delay
                    .map_or(att.inclusion_delay, |d| d.min(att.inclusion_delay)),
            );
        }
    }

    for index in eligible_indices {
        let effective_balance = state.validators[index].effective_balance;
        let reward_base = base_reward(effective_balance, total_active_balance, spec);
        let record = records.get(&index).copied().unwrap_or_default();

        if record.participated {
            if let Some(delay) = record.min_inclusion_delay {
                let inclusion_reward = reward_base / delay.max(1);
                state.balances[index] = state.balances[index].saturating_add(inclusion_reward);
            }
            if record.voted_target || !in_inactivity_leak {
                state.balances[index] = state.balances[index].saturating_add(reward_base);
            }
        } else {
            state.balances[index] = state.balances[index].saturating_sub(reward_base);
            if in_inactivity_leak {
                let leak_penalty = effective_balance
                    * (current_epoch.as_u64() - state.finalized_checkpoint.epoch.as_u64())
                    / spec.inactivity_penalty_quotient;
                state.balances[index] = state.balances[index].saturating_sub(leak_penalty);
            }
        }
    }
}
