use crate::errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
use types::{AttestationData, AttesterSlashing, BeaconState, ChainSpec, Domain, IndexedAttestation};

fn is_double_vote(a: &AttestationData, b: &AttestationData) -> bool {
    a.target.epoch == b.target.epoch
}

fn is_surround_vote(a: &AttestationData, b: &AttestationData) -> bool {
    (a.source.epoch < b.source.epoch && b.target.epoch < a.target.epoch)
        || (b.source.epoch < a.source.epoch && a.target.epoch < b.target.epoch)
}

fn verify_indexed_attestation(
    att: &IndexedAttestation,
    state: &BeaconState,
    spec: &ChainSpec,
) -> Result<(), OperationInvalidCause> {
    if att.attesting_indices.is_empty() {
        return Err(OperationInvalidCause::CommitteeMismatch);
    }
    if !att.attesting_indices.windows(2).all(|w| w[0] < w[1]) {
        return Err(OperationInvalidCause::CommitteeMismatch);
    }

    let pubkeys: Vec<_> = att
        .attesting_indices
        .iter()
        .map(|&i| {
            state
                .validators
                .get(i as usize)
                .map(|v| v.pubkey)
                .ok_or(OperationInvalidCause::UnknownValidator(i as usize))
        })
        .collect::<Result<_, _>>()?;

    let epoch = att.data.target.epoch;
    let domain = spec.get_domain(epoch, Domain::Attestation, &state.fork);
    let signing_root = types::Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(&att.data)[..]);

    let ok = bls_envelope::verify_aggregate_common_message(domain, signing_root, &pubkeys, &att.signature)
        .map_err(|_| OperationInvalidCause::BadSignature)?;
    if !ok {
        return Err(OperationInvalidCause::BadSignature);
    }

    Ok(())
}

fn verify_attester_slashing(
    slashing: &AttesterSlashing,
    state: &BeaconState,
    spec: &ChainSpec,
) -> Result<Vec<usize>, OperationInvalidCause> {
    let a = &slashing.attestation_1;
    let b = &slashing.attestation_2;

    if !(is_double_vote(&a.data, &b.data) || is_surround_vote(&a.data, &b.data)) {
        return Err(OperationInvalidCause::NotSlashable);
    }

    verify_indexed_attestation(a, state, spec)?;
    verify_indexed_attestation(b, state, spec)?;

    let mut slashable: Vec<usize> = a
        .attesting_indices
        .iter()
        .filter(|i| b.attesting_indices.contains(i))
        .map(|&i| i as usize)
        .filter(|&i| {
            state
                .validators
                .get(i)
                .map(|v| !v.slashed)
                .unwrap_or(false)
        })
        .collect();
    slashable.sort_unstable();
    slashable.dedup();

    if slashable.is_empty() {
        return Err(OperationInvalidCause::NotSlashable);
    }

    Ok(slashable)
}

/// Verifies and applies each attester slashing, slashing every validator common to both
/// attestations' signer sets that was not already slashed.
pub fn process_attester_slashings(
    state: &mut BeaconState,
    slashings: &[AttesterSlashing],
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if slashings.len() > spec.max_attester_slashings {
        return Err(BlockProcessingError::OperationOverflow {
            kind: OperationKind::AttesterSlashing,
            found: slashings.len(),
            max: spec.max_attester_slashings,
        });
    }

    for (i, slashing) in slashings.iter().enumerate() {
        let slashable_indices =
            verify_attester_slashing(slashing, state, spec).map_err(|cause| {
                BlockProcessingError::OperationInvalid {
                    kind: OperationKind::AttesterSlashing,
                    index: i,
                    cause,
                }
            })?;
        for index in slashable_indices {
            crate::common::initiate_slashing(state, index, spec)?;
        }
    }

    Ok(())
}
