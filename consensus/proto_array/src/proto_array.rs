use crate::error::Error;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use types::{Hash256, Slot};

/// One block in the fork-choice tree. Parent is stored as a root, looked up through `indices`
/// rather than held as an owning pointer or index, so the arena never needs `Rc`/`RefCell` to
/// break the cycle between a node and its children.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ProtoNode {
    pub slot: Slot,
    pub root: Hash256,
    pub parent_root: Option<Hash256>,
}

/// The block-tree arena. Nodes are appended as blocks arrive and removed only by
/// `prune_finalized`; `indices` gives O(1) root → node lookup.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct ProtoArray {
    pub nodes: Vec<ProtoNode>,
    pub indices: HashMap<Hash256, usize>,
}

impl ProtoArray {
    pub fn new(justified_root: Hash256, justified_slot: Slot) -> Self {
        let mut array = ProtoArray {
            nodes: vec![],
            indices: HashMap::new(),
        };
        array.indices.insert(justified_root, 0);
        array.nodes.push(ProtoNode {
            slot: justified_slot,
            root: justified_root,
            parent_root: None,
        });
        array
    }

    /// Inserts a node for `root`. Its parent must already be present in the arena (the
    /// justified root counts as present), otherwise this is an `OrphanBlock`.
    pub fn on_new_block(
        &mut self,
        root: Hash256,
        parent_root: Hash256,
        slot: Slot,
    ) -> Result<(), Error> {
        if !self.indices.contains_key(&parent_root) {
            return Err(Error::OrphanBlock { parent_root });
        }
        if self.indices.contains_key(&root) {
            return Ok(());
        }

        let index = self.nodes.len();
        self.nodes.push(ProtoNode {
            slot,
            root,
            parent_root: Some(parent_root),
        });
        self.indices.insert(root, index);
        Ok(())
    }

    pub fn contains_root(&self, root: &Hash256) -> bool {
        self.indices.contains_key(root)
    }

    pub fn node(&self, root: &Hash256) -> Option<&ProtoNode> {
        self.indices.get(root).map(|&i| &self.nodes[i])
    }

    /// All nodes currently held, in insertion order.
    pub fn nodes(&self) -> &[ProtoNode] {
        &self.nodes
    }

    pub fn children_of(&self, root: Hash256) -> Vec<&ProtoNode> {
        self.nodes
            .iter()
            .filter(|n| n.parent_root == Some(root))
            .collect()
    }

    /// Returns `true` if `descendant` is `ancestor` or a descendant of it.
    pub fn is_descendant(&self, ancestor: Hash256, descendant: Hash256) -> bool {
        let mut cursor = descendant;
        loop {
            if cursor == ancestor {
                return true;
            }
            match self.node(&cursor).and_then(|n| n.parent_root) {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    /// Drops every node that is not a descendant of `finalized_root`, re-rooting the arena at
    /// it. `finalized_root` itself must already be present.
    pub fn prune_finalized(&mut self, finalized_root: Hash256) -> Result<(), Error> {
        if !self.indices.contains_key(&finalized_root) {
            return Err(Error::FinalizedNodeUnknown);
        }

        let keep: Vec<ProtoNode> = self
            .nodes
            .iter()
            .filter(|n| n.root == finalized_root || self.is_descendant(finalized_root, n.root))
            .cloned()
            .collect();

        let mut indices = HashMap::new();
        for (i, node) in keep.iter().enumerate() {
            indices.insert(node.root, i);
        }

        self.nodes = keep;
        self.indices = indices;
        if let Some(root_node) = self.nodes.iter_mut().find(|n| n.root == finalized_root) {
            root_node.parent_root = None;
        }
        Ok(())
    }

    /// Walks from `from_root` down to the leaf of the heaviest subtree at every fork, per §4.6:
    /// at each node, descend into whichever child's subtree carries the greatest total weight
    /// in `weights` (keyed by block root, pre-aggregated by the caller from `latest_target`),
    /// tie-breaking on the lexicographically greater root. Terminates at a node with no
    /// children.
    pub fn find_head(
        &self,
        from_root: Hash256,
        weights: &HashMap<Hash256, u64>,
    ) -> Result<Hash256, Error> {
        if !self.indices.contains_key(&from_root) {
            return Err(Error::UnknownRoot(from_root));
        }

        let mut current = from_root;
        loop {
            let children = self.children_of(current);
            if children.is_empty() {
                return Ok(current);
            }

            let best = children
                .into_iter()
                .max_by(|a, b| {
                    let wa = weights.get(&a.root).copied().unwrap_or(0);
                    let wb = weights.get(&b.root).copied().unwrap_or(0);
                    wa.cmp(&wb).then_with(|| a.root.cmp(&b.root))
                })
                .expect("children is non-empty");

            current = best.root;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(byte: u8) -> Hash256 {
        Hash256::repeat_byte(byte)
    }

    #[test]
    fn orphan_block_rejected() {
        let mut array = ProtoArray::new(root(0), Slot::new(0));
        let err = array
            .on_new_block(root(9), root(8), Slot::new(1))
            .unwrap_err();
        assert_eq!(err, Error::OrphanBlock { parent_root: root(8) });
    }

    #[test]
    fn find_head_prefers_heavier_subtree() {
        let mut array = ProtoArray::new(root(0), Slot::new(0));
        array.on_new_block(root(1), root(0), Slot::new(1)).unwrap();
        array.on_new_block(root(2), root(0), Slot::new(1)).unwrap();
        array.on_new_block(root(3), root(1), Slot::new(2)).unwrap();

        let mut weights = HashMap::new();
        weights.insert(root(1), 10);
        weights.insert(root(2), 5);
        weights.insert(root(3), 10);

        let head = array.find_head(root(0), &weights).unwrap();
        assert_eq!(head, root(3));
    }

    #[test]
    fn prune_drops_non_descendants() {
        let mut array = ProtoArray::new(root(0), Slot::new(0));
        array.on_new_block(root(1), root(0), Slot::new(1)).unwrap();
        array.on_new_block(root(2), root(0), Slot::new(1)).unwrap();
        array.prune_finalized(root(1)).unwrap();

        assert!(array.contains_root(&root(1)));
        assert!(!array.contains_root(&root(2)));
    }
}
