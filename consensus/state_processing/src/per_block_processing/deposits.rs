use crate::errors::{BlockProcessingError, OperationInvalidCause, OperationKind};
use types::{BeaconState, ChainSpec, Deposit, Domain, Hash256, Validator};

/// Verifies a Merkle branch: combining `leaf` up through `branch` at `index`'s bit path must
/// reproduce `root`. Used to check a deposit against `state.eth1_data.deposit_root` without
/// depending on the deposit-contract accumulator's internals.
fn is_valid_merkle_branch(leaf: Hash256, branch: &[Hash256], index: u64, root: Hash256) -> bool {
    let mut value = leaf;
    for (i, node) in branch.iter().enumerate() {
        let mut input = [0u8; 64];
        if (index >> i) & 1 == 1 {
            input[0..32].copy_from_slice(node.as_bytes());
            input[32..64].copy_from_slice(value.as_bytes());
        } else {
            input[0..32].copy_from_slice(value.as_bytes());
            input[32..64].copy_from_slice(node.as_bytes());
        }
        value = Hash256::from_slice(&eth2_hashing::hash(&input));
    }
    value == root
}

fn verify_deposit(
    deposit: &Deposit,
    deposit_index: u64,
    state: &BeaconState,
    spec: &ChainSpec,
) -> Result<(), OperationInvalidCause> {
    if deposit.proof.len() != spec.deposit_contract_tree_depth + 1 {
        return Err(OperationInvalidCause::BadMerkleProof);
    }

    let leaf = Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(&deposit.data)[..]);
    if !is_valid_merkle_branch(
        leaf,
        &deposit.proof,
        deposit_index,
        state.eth1_data.deposit_root,
    ) {
        return Err(OperationInvalidCause::BadMerkleProof);
    }

    Ok(())
}

/// Applies a verified deposit: tops up an existing validator's balance, or appends a new
/// validator entry if its deposit signature is valid and its pubkey is unseen, matching the
/// reference client's "unknown pubkey requires a valid self-signature to onboard" rule.
fn apply_deposit(state: &mut BeaconState, deposit: &Deposit, spec: &ChainSpec) {
    let pubkey = deposit.data.pubkey;
    let amount = deposit.data.amount;

    if let Some(index) = state.validators.iter().position(|v| v.pubkey == pubkey) {
        state.balances[index] = state.balances[index].saturating_add(amount);
        return;
    }

    let domain = spec.get_domain(state.current_epoch(spec), Domain::Deposit, &state.fork);
    let signing_root =
        Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(&deposit.data)[..]);
    let signature_valid =
        bls_envelope::verify(domain, signing_root, &pubkey, &deposit.data.signature);
    if !signature_valid {
        return;
    }

    let effective_balance = amount
        .min(spec.max_effective_balance)
        / spec.effective_balance_increment
        * spec.effective_balance_increment;

    state.validators.push(Validator {
        pubkey,
        withdrawal_credentials: deposit.data.withdrawal_credentials,
        effective_balance,
        slashed: false,
        activation_eligibility_epoch: spec.far_future_epoch,
        activation_epoch: spec.far_future_epoch,
        exit_epoch: spec.far_future_epoch,
        withdrawable_epoch: spec.far_future_epoch,
    });
    state.balances.push(amount);
}

/// Applies deposits without merkle-proof verification, for genesis construction where
/// deposits come directly from a trusted genesis file rather than the deposit-contract log.
pub(crate) fn process_deposits_unchecked(state: &mut BeaconState, deposits: &[Deposit], spec: &ChainSpec) {
    for deposit in deposits {
        apply_deposit(state, deposit, spec);
        state.eth1_deposit_index += 1;
    }
}

/// Verifies and applies deposits in strict ascending index order starting at
/// `state.eth1_deposit_index`, per §4.5's ordering invariant.
pub fn process_deposits(
    state: &mut BeaconState,
    deposits: &[Deposit],
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if deposits.len() > spec.max_deposits {
        return Err(BlockProcessingError::OperationOverflow {
            kind: OperationKind::Deposit,
            found: deposits.len(),
            max: spec.max_deposits,
        });
    }

    for (i, deposit) in deposits.iter().enumerate() {
        let deposit_index = state.eth1_deposit_index;
        verify_deposit(deposit, deposit_index, state, spec).map_err(|cause| {
            BlockProcessingError::OperationInvalid {
                kind: OperationKind::Deposit,
                index: i,
                cause,
            }
        })?;
        apply_deposit(state, deposit, spec);
        state.eth1_deposit_index += 1;
    }

    Ok(())
}
