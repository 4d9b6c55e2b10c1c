use crate::errors::Error;
use proto_array::ProtoArray;
use std::collections::HashMap;
use types::{Hash256, Slot};

/// A validator's most recent attestation target, as tracked by fork choice. Monotone in
/// `slot`: `on_attestation` drops any update whose slot does not strictly exceed the stored
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationTarget {
    pub slot: Slot,
    pub block_root: Hash256,
    pub parent_root: Hash256,
}

/// A vote received for a slot later than the current head slot, held until that slot arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueuedAttestation {
    validator_index: u64,
    target: AttestationTarget,
}

/// The LMD-GHOST engine of C6: a block-tree arena plus the latest-target mapping, guarded
/// together so that head recomputation always observes a consistent snapshot of both.
pub struct ForkChoice {
    proto_array: ProtoArray,
    latest_targets: HashMap<u64, AttestationTarget>,
    queued: Vec<QueuedAttestation>,
    justified_root: Hash256,
    finalized_root: Hash256,
}

impl ForkChoice {
    pub fn new(justified_root: Hash256, justified_slot: Slot) -> Self {
        ForkChoice {
            proto_array: ProtoArray::new(justified_root, justified_slot),
            latest_targets: HashMap::new(),
            queued: vec![],
            justified_root,
            finalized_root: justified_root,
        }
    }

    pub fn justified_root(&self) -> Hash256 {
        self.justified_root
    }

    pub fn finalized_root(&self) -> Hash256 {
        self.finalized_root
    }

    pub fn contains_block(&self, root: &Hash256) -> bool {
        self.proto_array.contains_root(root)
    }

    /// The raw arena, for callers that need to walk the tree themselves (e.g. the `BlockTree`
    /// RPCs, which report per-node vote tallies alongside `slot`/`parent_root`).
    pub fn nodes(&self) -> &[proto_array::ProtoNode] {
        self.proto_array.nodes()
    }

    pub fn is_descendant(&self, ancestor: Hash256, descendant: Hash256) -> bool {
        self.proto_array.is_descendant(ancestor, descendant)
    }

    /// Inserts a new block. Its parent must already be known, or this is `OrphanBlock`.
    pub fn on_block(&mut self, root: Hash256, parent_root: Hash256, slot: Slot) -> Result<(), Error> {
        self.proto_array
            .on_new_block(root, parent_root, slot)
            .map_err(Error::from)
    }

    /// Records `validator_index`'s vote for `target` iff it is newer than any vote already on
    /// file, applying immediately if `target.slot <= current_slot` or queuing it otherwise
    /// (§9's "attestation monotonicity across concurrent writers" design note: the compare-
    /// and-swap happens while the caller holds this struct, which callers protect with their
    /// own mutex exactly as §5 specifies).
    pub fn on_attestation(
        &mut self,
        validator_index: u64,
        target: AttestationTarget,
        current_slot: Slot,
    ) {
        if target.slot > current_slot {
            self.queued.push(QueuedAttestation {
                validator_index,
                target,
            });
            return;
        }
        self.apply_target(validator_index, target);
    }

    fn apply_target(&mut self, validator_index: u64, target: AttestationTarget) {
        let is_newer = self
            .latest_targets
            .get(&validator_index)
            .map_or(true, |existing| target.slot > existing.slot);
        if is_newer {
            self.latest_targets.insert(validator_index, target);
        }
    }

    /// Releases any queued attestations whose slot has now arrived. Callers invoke this once
    /// per slot advance, before computing `head`.
    pub fn process_queued_attestations(&mut self, current_slot: Slot) {
        let (ready, pending): (Vec<_>, Vec<_>) = self
            .queued
            .drain(..)
            .partition(|q| q.target.slot <= current_slot);
        self.queued = pending;
        for q in ready {
            self.apply_target(q.validator_index, q.target);
        }
    }

    /// Prunes every node not descended from `new_finalized_root`, and drops latest-target
    /// entries for validators no longer present in `still_active`.
    pub fn on_finalize(
        &mut self,
        new_finalized_root: Hash256,
        still_active: &dyn Fn(u64) -> bool,
    ) -> Result<(), Error> {
        self.proto_array
            .prune_finalized(new_finalized_root)
            .map_err(Error::from)?;
        self.finalized_root = new_finalized_root;
        self.latest_targets.retain(|&index, _| still_active(index));
        Ok(())
    }

    pub fn set_justified_root(&mut self, root: Hash256) {
        self.justified_root = root;
    }

    /// Aggregates `latest_targets` into per-block subtree weights (`effective_balance` of the
    /// voting validator as provided by `balance_of`) and walks from the justified root to the
    /// head, per §4.6.
    pub fn head(&self, balance_of: impl Fn(u64) -> u64) -> Result<Hash256, Error> {
        let mut direct_weights: HashMap<Hash256, u64> = HashMap::new();
        for (&validator_index, target) in &self.latest_targets {
            *direct_weights.entry(target.block_root).or_insert(0) += balance_of(validator_index);
        }

        let subtree_weights = self.subtree_weights(&direct_weights);
        self.proto_array
            .find_head(self.justified_root, &subtree_weights)
            .map_err(Error::from)
    }

    /// Back-propagates each node's direct weight up to every ancestor, in a single backward
    /// pass over the arena — children are always appended after their parents, so this mirrors
    /// the reference `apply_score_changes` sweep without needing recursion.
    fn subtree_weights(&self, direct_weights: &HashMap<Hash256, u64>) -> HashMap<Hash256, u64> {
        let nodes = self.proto_array.nodes();
        let mut subtree: HashMap<Hash256, u64> = HashMap::new();
        for node in nodes {
            let direct = direct_weights.get(&node.root).copied().unwrap_or(0);
            *subtree.entry(node.root).or_insert(0) += direct;
        }
        for node in nodes.iter().rev() {
            if let Some(parent) = node.parent_root {
                let child_total = subtree.get(&node.root).copied().unwrap_or(0);
                *subtree.entry(parent).or_insert(0) += child_total;
            }
        }
        subtree
    }

    /// The "participated_votes" figure the `BlockTree` RPC exposes: the number of distinct
    /// validator targets whose latest vote names `subtree_root` directly (not its subtree),
    /// each weighted by `max_deposit_amount` per §4.6's literal definition (a flat per-voter
    /// weight, not the validator's actual effective balance, distinguishing it from `head()`'s
    /// GHOST weight).
    pub fn participated_votes(&self, subtree_root: Hash256, max_deposit_amount: u64) -> u64 {
        let count = self
            .latest_targets
            .values()
            .filter(|t| t.block_root == subtree_root)
            .count() as u64;
        count * max_deposit_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(b: u8) -> Hash256 {
        Hash256::repeat_byte(b)
    }

    #[test]
    fn head_follows_heaviest_vote() {
        let mut fc = ForkChoice::new(root(0), Slot::new(0));
        fc.on_block(root(1), root(0), Slot::new(1)).unwrap();
        fc.on_block(root(2), root(0), Slot::new(1)).unwrap();

        fc.on_attestation(
            1,
            AttestationTarget {
                slot: Slot::new(1),
                block_root: root(1),
                parent_root: root(0),
            },
            Slot::new(1),
        );
        fc.on_attestation(
            2,
            AttestationTarget {
                slot: Slot::new(1),
                block_root: root(2),
                parent_root: root(0),
            },
            Slot::new(1),
        );
        fc.on_attestation(
            3,
            AttestationTarget {
                slot: Slot::new(1),
                block_root: root(1),
                parent_root: root(0),
            },
            Slot::new(1),
        );

        let head = fc.head(|_| 32_000_000_000).unwrap();
        assert_eq!(head, root(1));
    }

    #[test]
    fn monotonic_target_update() {
        let mut fc = ForkChoice::new(root(0), Slot::new(0));
        fc.on_block(root(1), root(0), Slot::new(1)).unwrap();
        fc.on_block(root(2), root(0), Slot::new(1)).unwrap();

        fc.on_attestation(
            1,
            AttestationTarget { slot: Slot::new(5), block_root: root(1), parent_root: root(0) },
            Slot::new(5),
        );
        fc.on_attestation(
            1,
            AttestationTarget { slot: Slot::new(3), block_root: root(2), parent_root: root(0) },
            Slot::new(5),
        );

        assert_eq!(fc.latest_targets.get(&1).unwrap().block_root, root(1));
    }

    #[test]
    fn head_idempotent_without_updates() {
        let mut fc = ForkChoice::new(root(0), Slot::new(0));
        fc.on_block(root(1), root(0), Slot::new(1)).unwrap();
        let a = fc.head(|_| 1).unwrap();
        let b = fc.head(|_| 1).unwrap();
        assert_eq!(a, b);
    }
}
