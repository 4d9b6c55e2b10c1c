use crate::errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
use tree_hash::TreeHash;
use types::{Attestation, BeaconState, ChainSpec, Domain, Hash256, PendingAttestation};

fn verify_attestation(
    att: &Attestation,
    state: &BeaconState,
    spec: &ChainSpec,
) -> Result<(), OperationInvalidCause> {
    let data = &att.data;

    if data.slot.as_u64() + spec.min_attestation_inclusion_delay > state.slot.as_u64()
        || state.slot.as_u64() > data.slot.as_u64() + spec.slots_per_epoch
    {
        return Err(OperationInvalidCause::StaleInclusion);
    }

    let committee = state
        .get_beacon_committee(data.slot, data.shard, spec)
        .map_err(|_| OperationInvalidCause::CommitteeMismatch)?;
    if att.aggregation_bits.len() != committee.len() || att.custody_bits.len() != committee.len() {
        return Err(OperationInvalidCause::CommitteeMismatch);
    }

    let attesting_indices: Vec<usize> = committee
        .iter()
        .zip(att.aggregation_bits.iter())
        .filter(|(_, bit)| **bit)
        .map(|(&index, _)| index)
        .collect();
    if attesting_indices.is_empty() {
        return Err(OperationInvalidCause::CommitteeMismatch);
    }

    let pubkeys: Vec<_> = attesting_indices
        .iter()
        .map(|&i| state.validators[i].pubkey)
        .collect();

    let epoch = data.target.epoch;
    let domain = spec.get_domain(epoch, Domain::Attestation, &state.fork);
    let signing_root = Hash256::from_slice(&data.tree_hash_root()[..]);

    let verified =
        bls_envelope::verify_aggregate_common_message(domain, signing_root, &pubkeys, &att.signature)
            .map_err(|_| OperationInvalidCause::BadSignature)?;
    if !verified {
        return Err(OperationInvalidCause::BadSignature);
    }

    Ok(())
}

/// Verifies each attestation against current committee membership and signatures, then queues
/// it as a `PendingAttestation` for epoch-boundary reward accounting, bucketed by whether its
/// vote targets the current or previous epoch.
pub fn process_attestations(
    state: &mut BeaconState,
    attestations: &[Attestation],
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if attestations.len() > spec.max_attestations {
        return Err(BlockProcessingError::OperationOverflow {
            kind: OperationKind::Attestation,
            found: attestations.len(),
            max: spec.max_attestations,
        });
    }

    let current_epoch = state.current_epoch(spec);
    let proposer_index = state
        .get_beacon_proposer_index(state.slot, spec)
        .map_err(|_| BlockProcessingError::InvariantViolation("no active proposer"))?;

    for (i, att) in attestations.iter().enumerate() {
        verify_attestation(att, state, spec).map_err(|cause| {
            BlockProcessingError::OperationInvalid {
                kind: OperationKind::Attestation,
                index: i,
                cause,
            }
        })?;

        let inclusion_delay = state.slot.as_u64() - att.data.slot.as_u64();
        let pending = PendingAttestation {
            aggregation_bits: att.aggregation_bits.clone(),
            data: att.data.clone(),
            inclusion_delay,
            proposer_index: proposer_index as u64,
        };

        if att.data.target.epoch == current_epoch {
            state.current_epoch_attestations.push(pending);
        } else {
            state.previous_epoch_attestations.push(pending);
        }
    }

    Ok(())
}
