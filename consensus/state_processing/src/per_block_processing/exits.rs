use crate::errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
use types::{BeaconState, ChainSpec, Domain, Hash256, SignedVoluntaryExit};

fn verify_voluntary_exit(
    exit: &SignedVoluntaryExit,
    state: &BeaconState,
    spec: &ChainSpec,
) -> Result<(), OperationInvalidCause> {
    let index = exit.message.validator_index as usize;
    let validator = state
        .validators
        .get(index)
        .ok_or(OperationInvalidCause::UnknownValidator(index))?;

    let current_epoch = state.current_epoch(spec);
    if !validator.is_active_at(current_epoch) {
        return Err(OperationInvalidCause::NotActive);
    }
    if validator.exit_epoch != spec.far_future_epoch {
        return Err(OperationInvalidCause::AlreadyExited);
    }
    if current_epoch < exit.message.epoch {
        return Err(OperationInvalidCause::NotEligibleToExit);
    }
    if current_epoch < validator.activation_epoch + spec.activation_exit_delay {
        return Err(OperationInvalidCause::NotEligibleToExit);
    }

    let domain = spec.get_domain(exit.message.epoch, Domain::VoluntaryExit, &state.fork);
    let signing_root = Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(&exit.message)[..]);
    if !bls_envelope::verify(domain, signing_root, &validator.pubkey, &exit.signature) {
        return Err(OperationInvalidCause::BadSignature);
    }

    Ok(())
}

/// Verifies and applies each voluntary exit via `initiate_validator_exit`.
pub fn process_voluntary_exits(
    state: &mut BeaconState,
    exits: &[SignedVoluntaryExit],
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if exits.len() > spec.max_voluntary_exits {
        return Err(BlockProcessingError::OperationOverflow {
            kind: OperationKind::VoluntaryExit,
            found: exits.len(),
            max: spec.max_voluntary_exits,
        });
    }

    for (i, exit) in exits.iter().enumerate() {
        verify_voluntary_exit(exit, state, spec).map_err(|cause| {
            BlockProcessingError::OperationInvalid {
                kind: OperationKind::VoluntaryExit,
                index: i,
                cause,
            }
        })?;
        crate::common::initiate_validator_exit(state, exit.message.validator_index as usize, spec)?;
    }

    Ok(())
}
