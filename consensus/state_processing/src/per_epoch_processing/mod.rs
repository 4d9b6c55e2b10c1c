mod final_updates;
mod justification_and_finalization;
mod registry_updates;
mod rewards_and_penalties;
mod slashings;

use crate::errors::BlockProcessingError;
use types::{BeaconState, ChainSpec};

/// Runs the six steps of epoch-boundary accounting in order, per §4.4.
pub fn per_epoch_processing(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    justification_and_finalization::process_justification_and_finalization(state, spec)?;
    rewards_and_penalties::process_rewards_and_penalties(state, spec);
    registry_updates::process_registry_updates(state, spec)?;
    slashings::process_slashings(state, spec);
    final_updates::process_final_updates(state, spec);
    Ok(())
}
