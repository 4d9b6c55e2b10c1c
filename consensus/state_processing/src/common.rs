use crate::errors::BlockProcessingError;
use types::{BeaconState, ChainSpec, Epoch};

/// Marks `index` exited, scheduling it for withdrawal at the standard delay from the current
/// epoch. Shared by voluntary exits and by both slashing paths' "initiate exit" step.
pub fn initiate_validator_exit(
    state: &mut BeaconState,
    index: usize,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if state.validators[index].exit_epoch != spec.far_future_epoch {
        return Ok(());
    }

    let current_epoch = state.current_epoch(spec);

    let exit_epochs: Vec<Epoch> = state
        .validators
        .iter()
        .map(|v| v.exit_epoch)
        .filter(|&e| e != spec.far_future_epoch)
        .collect();
    let mut exit_queue_epoch = exit_epochs
        .iter()
        .copied()
        .max()
        .unwrap_or_else(|| current_epoch.saturating_add(Epoch::new(spec.activation_exit_delay)))
        .max(current_epoch.saturating_add(Epoch::new(spec.activation_exit_delay)));

    let exit_queue_churn = exit_epochs.iter().filter(|&&e| e == exit_queue_epoch).count();
    if exit_queue_churn as u64 >= churn_limit(state, spec) {
        exit_queue_epoch += 1;
    }

    state.validators[index].exit_epoch = exit_queue_epoch;
    state.validators[index].withdrawable_epoch =
        exit_queue_epoch + spec.min_validator_withdrawability_delay.as_u64();

    Ok(())
}

pub fn churn_limit(state: &BeaconState, spec: &ChainSpec) -> u64 {
    let active_count = state
        .get_active_validator_indices(state.current_epoch(spec))
        .len() as u64;
    std::cmp::max(
        spec.min_per_epoch_churn_limit,
        active_count / spec.churn_limit_quotient,
    )
}

/// Marks `index` slashed, slashes a portion of its effective balance immediately, and starts
/// its exit, matching the combined proposer/attester slashing effect from C4.
pub fn initiate_slashing(
    state: &mut BeaconState,
    index: usize,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    initiate_validator_exit(state, index, spec)?;

    state.validators[index].slashed = true;
    state.validators[index].withdrawable_epoch = state.validators[index].withdrawable_epoch.max(
        state
            .current_epoch(spec)
            .saturating_add(Epoch::new(spec.min_validator_withdrawability_delay.as_u64())),
    );

    let penalty = state.validators[index].effective_balance / spec.min_slashing_penalty_quotient;
    state.balances[index] = state.balances[index].saturating_sub(penalty);

    Ok(())
}
