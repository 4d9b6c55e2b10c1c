use crate::{Checkpoint, Hash256, Slot};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// The vote content of an `Attestation`: which block and FFG checkpoints a committee member is
/// attesting to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct AttestationData {
    pub slot: Slot,
    pub shard: u64,
    pub beacon_block_root: Hash256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

/// An aggregated attestation as it arrives over the wire: one vote (`data`) plus the set of
/// committee members who co-signed it. `aggregation_bits[i]` set means committee member `i`'s
/// signature is folded into `signature`; `custody_bits` is carried for forward-compatibility
/// with shard-data custody games and is otherwise unused by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Attestation {
    pub aggregation_bits: Vec<bool>,
    pub data: AttestationData,
    pub custody_bits: Vec<bool>,
    pub signature: crate::SignatureBytes,
}

impl Attestation {
    /// `true` if `self` and `other` vote identically and their committee-member sets are
    /// disjoint, meaning they can be merged into a single aggregate.
    pub fn signers_disjoint_from(&self, other: &Attestation) -> bool {
        self.data == other.data
            && self.aggregation_bits.len() == other.aggregation_bits.len()
            && self
                .aggregation_bits
                .iter()
                .zip(other.aggregation_bits.iter())
                .all(|(a, b)| !(*a && *b))
    }

    /// OR's `other`'s aggregation bits into `self`. The combined BLS signature is produced by the
    /// caller via `bls_envelope::aggregate_sigs` and assigned into `self.signature` separately;
    /// this only folds the bitfield, matching how the operation pool applies it in two steps.
    pub fn aggregate_bits(&mut self, other: &Attestation) {
        for (a, b) in self.aggregation_bits.iter_mut().zip(other.aggregation_bits.iter()) {
            *a |= *b;
        }
    }

    pub fn num_set_bits(&self) -> usize {
        self.aggregation_bits.iter().filter(|b| **b).count()
    }
}

/// The same vote, already verified against committee membership: `attesting_indices` replaces
/// the positional bitfield with the actual validator indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct IndexedAttestation {
    pub attesting_indices: Vec<u64>,
    pub data: AttestationData,
    pub signature: crate::SignatureBytes,
}

/// The form an attestation takes once it has been accepted by `process_attestations` and is
/// awaiting epoch-boundary reward accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct PendingAttestation {
    pub aggregation_bits: Vec<bool>,
    pub data: AttestationData,
    pub inclusion_delay: u64,
    pub proposer_index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(set: &[usize], len: usize) -> Vec<bool> {
        let mut b = vec![false; len];
        for &i in set {
            b[i] = true;
        }
        b
    }

    fn att(aggregation_bits: Vec<bool>) -> Attestation {
        Attestation {
            aggregation_bits,
            data: AttestationData::default(),
            custody_bits: vec![],
            signature: crate::SignatureBytes::zero(),
        }
    }

    #[test]
    fn disjoint_merge() {
        let mut a = att(bits(&[0, 2], 4));
        let b = att(bits(&[1, 3], 4));
        assert!(a.signers_disjoint_from(&b));
        a.aggregate_bits(&b);
        assert_eq!(a.aggregation_bits, bits(&[0, 1, 2, 3], 4));
    }

    #[test]
    fn overlapping_not_disjoint() {
        let a = att(bits(&[0, 1], 4));
        let b = att(bits(&[1, 2], 4));
        assert!(!a.signers_disjoint_from(&b));
    }
}
