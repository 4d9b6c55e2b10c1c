use crate::common::{churn_limit, initiate_validator_exit};
use crate::errors::BlockProcessingError;
use types::{BeaconState, ChainSpec};

/// Step 3 of epoch processing: advances eligible validators into the activation queue,
/// activates as many as the per-epoch churn cap allows (ordered by activation-eligibility
/// epoch, then registry index), and starts the exit of anyone whose balance fell below the
/// ejection threshold.
pub fn process_registry_updates(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let current_epoch = state.current_epoch(spec);

    for index in 0..state.validators.len() {
        if state.validators[index].is_eligible_for_activation_queue(spec) {
            state.validators[index].activation_eligibility_epoch = current_epoch + 1;
        }

        let is_active = state.validators[index].is_active_at(current_epoch);
        if is_active
            && state.validators[index].effective_balance <= spec.ejection_balance
            && state.validators[index].exit_epoch == spec.far_future_epoch
        {
            initiate_validator_exit(state, index, spec)?;
        }
    }

    let delayed_activation_epoch = current_epoch + spec.activation_exit_delay;
    let mut queue: Vec<usize> = (0..state.validators.len())
        .filter(|&i| {
            state.validators[i].activation_eligibility_epoch != spec.far_future_epoch
                && state.validators[i].activation_epoch == spec.far_future_epoch
        })
        .collect();
    queue.sort_by_key(|&i| {
        (
            state.validators[i].activation_eligibility_epoch.as_u64(),
            i as u64,
        )
    });

    let limit = churn_limit(state, spec) as usize;
    for &index in queue.iter().take(limit) {
        state.validators[index].activation_epoch = delayed_activation_epoch;
    }

    Ok(())
}
