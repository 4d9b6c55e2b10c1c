use crate::errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
use types::{BeaconState, ChainSpec, Domain, ProposerSlashing};

fn verify_proposer_slashing(
    slashing: &ProposerSlashing,
    state: &BeaconState,
    spec: &ChainSpec,
) -> Result<(), OperationInvalidCause> {
    let index = slashing.proposer_index as usize;
    let proposer = state
        .validators
        .get(index)
        .ok_or(OperationInvalidCause::UnknownValidator(index))?;

    let header_1 = &slashing.signed_header_1.message;
    let header_2 = &slashing.signed_header_2.message;

    if header_1.slot != header_2.slot {
        return Err(OperationInvalidCause::BadHeader);
    }
    if header_1 == header_2 {
        return Err(OperationInvalidCause::NotSlashable);
    }
    if proposer.slashed {
        return Err(OperationInvalidCause::AlreadySlashed);
    }

    let epoch = header_1.slot.epoch(spec.slots_per_epoch);
    let domain = spec.get_domain(epoch, Domain::BeaconProposer, &state.fork);

    for (header, signature) in [
        (header_1, &slashing.signed_header_1.signature),
        (header_2, &slashing.signed_header_2.signature),
    ] {
        let signing_root = header.signing_root();
        if !bls_envelope::verify(domain, signing_root, &proposer.pubkey, signature) {
            return Err(OperationInvalidCause::BadSignature);
        }
    }

    Ok(())
}

/// Verifies and applies each proposer slashing via `initiate_slashing`, in order, failing at
/// the first invalid entry.
pub fn process_proposer_slashings(
    state: &mut BeaconState,
    slashings: &[ProposerSlashing],
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if slashings.len() > spec.max_proposer_slashings {
        return Err(BlockProcessingError::OperationOverflow {
            kind: OperationKind::ProposerSlashing,
            found: slashings.len(),
            max: spec.max_proposer_slashings,
        });
    }

    for (i, slashing) in slashings.iter().enumerate() {
        verify_proposer_slashing(slashing, state, spec).map_err(|cause| {
            BlockProcessingError::OperationInvalid {
                kind: OperationKind::ProposerSlashing,
                index: i,
                cause,
            }
        })?;
        crate::common::initiate_slashing(state, slashing.proposer_index as usize, spec)?;
    }

    Ok(())
}
