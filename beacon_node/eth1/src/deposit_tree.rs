use types::Hash256;

/// The deposit-contract's incremental Merkle accumulator (§1's "Merkle-trie deposit-contract
/// accumulator" external collaborator), reimplemented here since this crate is the natural place
/// for a follower to attach proofs to the deposit logs it reports. Builds a tree of
/// `deposit_contract_tree_depth` and mixes in the leaf count as the contract does, so
/// `deposit.proof.len() == depth + 1` as `state_processing::per_block_processing::deposits`
/// expects.
pub struct DepositDataTree {
    depth: usize,
    leaves: Vec<Hash256>,
    zero_hashes: Vec<Hash256>,
}

impl DepositDataTree {
    pub fn new(depth: usize) -> Self {
        let mut zero_hashes = vec![Hash256::zero(); depth + 1];
        for level in 1..=depth {
            let child = zero_hashes[level - 1];
            zero_hashes[level] = hash_pair(child, child);
        }
        DepositDataTree {
            depth,
            leaves: vec![],
            zero_hashes,
        }
    }

    pub fn push_leaf(&mut self, leaf: Hash256) -> u64 {
        let index = self.leaves.len() as u64;
        self.leaves.push(leaf);
        index
    }

    pub fn len(&self) -> u64 {
        self.leaves.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The branch from `index`'s leaf to the root, with the leaf-count length mixin appended as
    /// the final element.
    pub fn proof(&self, index: u64) -> Vec<Hash256> {
        let mut branch = Vec::with_capacity(self.depth + 1);
        let mut level_nodes = self.leaves.clone();
        let mut idx = index as usize;

        for level in 0..self.depth {
            let sibling = if idx % 2 == 0 {
                level_nodes.get(idx + 1).copied().unwrap_or(self.zero_hashes[level])
            } else {
                level_nodes[idx - 1]
            };
            branch.push(sibling);

            let mut next_level = Vec::with_capacity(level_nodes.len() / 2 + 1);
            let mut i = 0;
            while i < level_nodes.len() {
                let left = level_nodes[i];
                let right = level_nodes
                    .get(i + 1)
                    .copied()
                    .unwrap_or(self.zero_hashes[level]);
                next_level.push(hash_pair(left, right));
                i += 2;
            }
            level_nodes = next_level;
            idx /= 2;
        }

        branch.push(length_mixin(self.leaves.len() as u64));
        branch
    }

    pub fn root(&self) -> Hash256 {
        let mut level_nodes = self.leaves.clone();
        for level in 0..self.depth {
            let mut next_level = Vec::with_capacity(level_nodes.len() / 2 + 1);
            let mut i = 0;
            while i < level_nodes.len() {
                let left = level_nodes[i];
                let right = level_nodes
                    .get(i + 1)
                    .copied()
                    .unwrap_or(self.zero_hashes[level]);
                next_level.push(hash_pair(left, right));
                i += 2;
            }
            level_nodes = next_level;
            if level_nodes.is_empty() {
                level_nodes.push(self.zero_hashes[level + 1]);
            }
        }
        let unmixed_root = level_nodes.first().copied().unwrap_or(self.zero_hashes[self.depth]);
        hash_pair(unmixed_root, length_mixin(self.leaves.len() as u64))
    }
}

fn hash_pair(left: Hash256, right: Hash256) -> Hash256 {
    let mut input = [0u8; 64];
    input[0..32].copy_from_slice(left.as_bytes());
    input[32..64].copy_from_slice(right.as_bytes());
    Hash256::from_slice(&eth2_hashing::hash(&input))
}

fn length_mixin(count: u64) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[0..8].copy_from_slice(&count.to_le_bytes());
    Hash256::from_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_validates_against_root() {
        let mut tree = DepositDataTree::new(4);
        let leaves: Vec<Hash256> = (0..3).map(|i| Hash256::repeat_byte(i as u8)).collect();
        for leaf in &leaves {
            tree.push_leaf(*leaf);
        }

        let root = tree.root();
        for (index, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(index as u64);
            assert!(verify(*leaf, &proof, index as u64, root));
        }
    }

    fn verify(leaf: Hash256, branch: &[Hash256], index: u64, root: Hash256) -> bool {
        let mut value = leaf;
        for (i, node) in branch.iter().enumerate() {
            value = if (index >> i) & 1 == 1 {
                hash_pair(*node, value)
            } else {
                hash_pair(value, *node)
            };
        }
        value == root
    }
}
