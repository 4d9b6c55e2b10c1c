use types::{BeaconState, ChainSpec};

/// Step 4 of epoch processing: at the midpoint of the slashing retention window, applies the
/// correlation penalty to every still-slashed validator proportional to the total slashed
/// balance observed over the window.
pub fn process_slashings(state: &mut BeaconState, spec: &ChainSpec) {
    let current_epoch = state.current_epoch(spec);
    let total_balance =
        state.get_total_balance(&state.get_active_validator_indices(current_epoch), spec);

    let half_window = spec.min_validator_withdrawability_delay.as_u64() / 2;
    let total_slashed: u64 = state
        .validators
        .iter()
        .filter(|v| v.slashed && v.withdrawable_epoch.as_u64() == current_epoch.as_u64() + half_window)
        .map(|v| v.effective_balance)
        .sum();

    if total_slashed == 0 {
        return;
    }

    let adjusted_total_slashing_balance = total_slashed.saturating_mul(3).min(total_balance);

    for index in 0..state.validators.len() {
        let v = &state.validators[index];
        if v.slashed && v.withdrawable_epoch.as_u64() == current_epoch.as_u64() + half_window {
            let effective_balance = v.effective_balance;
            let penalty = effective_balance / spec.effective_balance_increment
                * adjusted_total_slashing_balance
                / total_balance.max(1)
                * spec.effective_balance_increment;
            state.balances[index] = state.balances[index].saturating_sub(penalty);
        }
    }
}
