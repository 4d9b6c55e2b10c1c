use serde_derive::{Deserialize, Serialize};
use tree_hash::TreeHash;
use types::{AttestationData, Fork, Hash256};

/// Groups attestations that vote identically under the same fork, so the pool can merge
/// disjoint-bitfield aggregates that arrive separately (§4.7's `(slot, shard, data_root)` index,
/// generalized to include the fork since two forks can otherwise produce colliding data roots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttestationId(Hash256);

impl AttestationId {
    pub fn from_data(data: &AttestationData, fork: &Fork) -> Self {
        let mut bytes = data.tree_hash_root()[..].to_vec();
        bytes.extend_from_slice(&fork.tree_hash_root()[..]);
        AttestationId(Hash256::from_slice(&eth2_hashing::hash(&bytes)))
    }
}
