mod attestation_id;
mod errors;
mod metrics;

pub use attestation_id::AttestationId;
pub use errors::OpPoolError;

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use types::{
    Attestation, AttesterSlashing, ChainSpec, Deposit, Fork, Hash256, ProposerSlashing,
    SignedVoluntaryExit, Slot,
};

/// Holds every operation kind named in C7, each behind its own lock so that, e.g., a slow
/// deposit-index scan never blocks attestation aggregation.
#[derive(Default)]
pub struct OperationPool {
    attestations: RwLock<HashMap<AttestationId, Vec<Attestation>>>,
    deposits: RwLock<HashMap<u64, Deposit>>,
    attester_slashings: RwLock<HashMap<Hash256, AttesterSlashing>>,
    proposer_slashings: RwLock<HashMap<u64, ProposerSlashing>>,
    voluntary_exits: RwLock<HashMap<u64, SignedVoluntaryExit>>,
}

impl OperationPool {
    pub fn new() -> Self {
        OperationPool::default()
    }

    /// Inserts `attestation` under its `(data, fork)` group. An existing entry whose signer set
    /// is disjoint is merged in place (bitfield OR, signatures aggregated); an entry with
    /// overlapping signers is left alone and `attestation` is retained as a second entry, per
    /// C7.
    pub fn insert_attestation(
        &self,
        attestation: Attestation,
        fork: &Fork,
    ) -> Result<(), OpPoolError> {
        let id = AttestationId::from_data(&attestation.data, fork);
        let mut attestations = self.attestations.write();
        let group = attestations.entry(id).or_insert_with(Vec::new);

        for existing in group.iter_mut() {
            if existing.aggregation_bits == attestation.aggregation_bits {
                return Ok(());
            }
            if existing.signers_disjoint_from(&attestation) {
                let merged_signature = bls_envelope::aggregate_sigs(&[
                    existing.signature.clone(),
                    attestation.signature.clone(),
                ])?;
                existing.aggregate_bits(&attestation);
                existing.signature = merged_signature;
                metrics::set_counts(&attestations);
                return Ok(());
            }
        }
        group.push(attestation);
        metrics::set_counts(&attestations);
        Ok(())
    }

    /// Returns attestations ready for inclusion in a block proposed at `proposal_slot`:
    /// `data.slot + MinAttestationInclusionDelay <= proposal_slot`, ascending by slot, capped at
    /// `spec.max_attestations`.
    pub fn pending_attestations(&self, proposal_slot: Slot, spec: &ChainSpec) -> Vec<Attestation> {
        let attestations = self.attestations.read();
        let mut ready: Vec<Attestation> = attestations
            .values()
            .flat_map(|group| group.iter().cloned())
            .filter(|att| {
                att.data.slot.as_u64() + spec.min_attestation_inclusion_delay
                    <= proposal_slot.as_u64()
            })
            .collect();
        ready.sort_by_key(|att| att.data.slot);
        ready.truncate(spec.max_attestations);
        ready
    }

    /// Drops every attestation group whose data hash is in `finalized_data_roots`. Idempotent:
    /// calling it twice with the same set is a no-op the second time.
    pub fn prune_attestations(&self, finalized_data_roots: &HashSet<Hash256>) {
        let mut attestations = self.attestations.write();
        attestations.retain(|_, group| {
            group.retain(|att| {
                let data_root = Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(
                    &att.data,
                )[..]);
                !finalized_data_roots.contains(&data_root)
            });
            !group.is_empty()
        });
        metrics::set_counts(&attestations);
    }

    pub fn insert_deposit(&self, index: u64, deposit: Deposit) {
        self.deposits.write().insert(index, deposit);
    }

    pub fn get_deposits(&self, min_index: u64, max_deposits: usize) -> Vec<Deposit> {
        let deposits = self.deposits.read();
        let mut indices: Vec<u64> = deposits
            .keys()
            .copied()
            .filter(|i| *i >= min_index)
            .collect();
        indices.sort_unstable();
        indices.truncate(max_deposits);
        indices
            .into_iter()
            .map(|i| deposits.get(&i).unwrap().clone())
            .collect()
    }

    pub fn prune_deposits(&self, up_to_index: u64) {
        self.deposits.write().retain(|index, _| *index >= up_to_index);
    }

    pub fn insert_attester_slashing(&self, id: Hash256, slashing: AttesterSlashing) {
        self.attester_slashings.write().insert(id, slashing);
    }

    pub fn get_attester_slashings(&self, max: usize) -> Vec<AttesterSlashing> {
        self.attester_slashings
            .read()
            .values()
            .take(max)
            .cloned()
            .collect()
    }

    pub fn insert_proposer_slashing(&self, proposer_index: u64, slashing: ProposerSlashing) {
        self.proposer_slashings.write().insert(proposer_index, slashing);
    }

    pub fn get_proposer_slashings(&self, max: usize) -> Vec<ProposerSlashing> {
        self.proposer_slashings
            .read()
            .values()
            .take(max)
            .cloned()
            .collect()
    }

    pub fn insert_voluntary_exit(&self, validator_index: u64, exit: SignedVoluntaryExit) {
        self.voluntary_exits.write().insert(validator_index, exit);
    }

    pub fn get_voluntary_exits(&self, max: usize) -> Vec<SignedVoluntaryExit> {
        self.voluntary_exits.read().values().take(max).cloned().collect()
    }

    pub fn prune_validator_operations(&self, finalized_validator_indices: &HashSet<u64>) {
        self.proposer_slashings
            .write()
            .retain(|index, _| !finalized_validator_indices.contains(index));
        self.voluntary_exits
            .write()
            .retain(|index, _| !finalized_validator_indices.contains(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls_envelope::SecretKeyPair;
    use types::AttestationData;

    fn bits(set: &[usize], len: usize) -> Vec<bool> {
        let mut b = vec![false; len];
        for &i in set {
            b[i] = true;
        }
        b
    }

    fn signed_attestation(aggregation_bits: Vec<bool>, data: AttestationData) -> Attestation {
        let secret = SecretKeyPair::from_seed(&[7u8; 32]).unwrap();
        let root = Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(&data)[..]);
        let signature = bls_envelope::sign(&secret, [0u8; 8], root);
        Attestation {
            aggregation_bits,
            data,
            custody_bits: vec![],
            signature,
        }
    }

    #[test]
    fn disjoint_attestations_merge_into_one_aggregate() {
        let pool = OperationPool::new();
        let fork = Fork::genesis(types::Epoch::new(0));
        let data = AttestationData {
            slot: Slot::new(1),
            ..Default::default()
        };

        pool.insert_attestation(signed_attestation(bits(&[0, 2], 4), data.clone()), &fork)
            .unwrap();
        pool.insert_attestation(signed_attestation(bits(&[1, 3], 4), data.clone()), &fork)
            .unwrap();

        let attestations = pool.attestations.read();
        let id = AttestationId::from_data(&data, &fork);
        let group = attestations.get(&id).unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].aggregation_bits, bits(&[0, 1, 2, 3], 4));
    }

    #[test]
    fn overlapping_attestations_are_both_retained() {
        let pool = OperationPool::new();
        let fork = Fork::genesis(types::Epoch::new(0));
        let data = AttestationData {
            slot: Slot::new(1),
            ..Default::default()
        };

        pool.insert_attestation(signed_attestation(bits(&[0, 1], 4), data.clone()), &fork)
            .unwrap();
        pool.insert_attestation(signed_attestation(bits(&[1, 2], 4), data.clone()), &fork)
            .unwrap();

        let attestations = pool.attestations.read();
        let id = AttestationId::from_data(&data, &fork);
        assert_eq!(attestations.get(&id).unwrap().len(), 2);
    }

    #[test]
    fn pending_attestations_respects_inclusion_delay_and_cap() {
        let pool = OperationPool::new();
        let fork = Fork::genesis(types::Epoch::new(0));
        let spec = ChainSpec::mainnet();

        for slot in [1u64, 2, 3] {
            let data = AttestationData {
                slot: Slot::new(slot),
                ..Default::default()
            };
            pool.insert_attestation(signed_attestation(bits(&[0], 4), data), &fork)
                .unwrap();
        }

        let proposal_slot = Slot::new(2 + spec.min_attestation_inclusion_delay);
        let ready = pool.pending_attestations(proposal_slot, &spec);
        assert_eq!(ready.len(), 2);
        assert!(ready.iter().all(|a| a.data.slot.as_u64() <= 2));
    }

    #[test]
    fn get_deposits_is_sorted_and_capped() {
        let pool = OperationPool::new();
        for i in 0..5u64 {
            pool.insert_deposit(
                i,
                Deposit {
                    proof: vec![],
                    data: Default::default(),
                },
            );
        }
        let deposits = pool.get_deposits(2, 2);
        assert_eq!(deposits.len(), 2);
    }
}
