use crate::errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
use tree_hash::TreeHash;
use types::{BeaconBlock, BeaconState, ChainSpec, Domain, Hash256};

/// Verifies the proposer's randao reveal against their public key, then folds it into this
/// epoch's randao mix via XOR-of-hash, per C2/C4.
pub fn process_randao(
    state: &mut BeaconState,
    block: &BeaconBlock,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let epoch = state.current_epoch(spec);
    let proposer_index = state
        .get_beacon_proposer_index(block.slot, spec)
        .map_err(|_| BlockProcessingError::InvariantViolation("no active proposer"))?;
    let proposer = &state.validators[proposer_index];

    let domain = spec.get_domain(epoch, Domain::Randao, &state.fork);
    let signing_root = Hash256::from_slice(&epoch.tree_hash_root()[..]);

    let verified = bls_envelope::verify(
        domain,
        signing_root,
        &proposer.pubkey,
        &block.body.randao_reveal,
    );
    if !verified {
        return Err(BlockProcessingError::OperationInvalid {
            kind: OperationKind::Randao,
            index: proposer_index,
            cause: OperationInvalidCause::BadSignature,
        });
    }

    let reveal_hash = eth2_hashing::hash(block.body.randao_reveal.as_bytes());
    let mix_index = epoch.as_u64() as usize % state.randao_mixes.len();
    let mut new_mix = [0u8; 32];
    for i in 0..32 {
        new_mix[i] = state.randao_mixes[mix_index].as_bytes()[i] ^ reveal_hash[i];
    }
    state.randao_mixes[mix_index] = Hash256::from_slice(&new_mix);

    Ok(())
}
