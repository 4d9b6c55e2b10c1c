use crate::errors::Error;
use crate::BeaconChain;
use types::{Hash256, Slot};

/// One row of a `BlockTree`/`BlockTreeBySlots` response: a fork-choice node enriched with the
/// vote tallies §4.6 defines for the RPC surface. `participated_votes` comes straight from
/// `ForkChoice::participated_votes`; `total_votes` is read back out of the historical state
/// stored for this block, since fork choice itself never holds effective balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTreeNode {
    pub block_root: Hash256,
    pub parent_root: Option<Hash256>,
    pub slot: Slot,
    pub participated_votes: u64,
    pub total_votes: u64,
}

impl BeaconChain {
    /// All fork-choice nodes descended from the finalized root, ordered by their proposer's
    /// randao reveal (ascending), the tie-break the RPC's literal worked example is built
    /// around. The finalized/justified anchor node itself is excluded: "from the last finalized
    /// block forward" names its descendants, not the anchor.
    pub fn block_tree(&self) -> Result<Vec<BlockTreeNode>, Error> {
        let (proto_nodes, finalized_root): (Vec<_>, Hash256) = {
            let fork_choice = self.fork_choice.lock();
            (fork_choice.nodes().to_vec(), fork_choice.finalized_root())
        };

        let mut rows = Vec::with_capacity(proto_nodes.len());
        for node in proto_nodes.iter().filter(|n| n.root != finalized_root) {
            let participated_votes = {
                let fork_choice = self.fork_choice.lock();
                fork_choice.participated_votes(node.root, self.spec.max_deposit_amount)
            };
            let total_votes = self.proposer_effective_balance_at(node.root, node.slot)?;
            let randao_reveal = self
                .store
                .get_block(&node.root)?
                .ok_or(Error::MissingHead)?
                .message
                .body
                .randao_reveal;
            rows.push((randao_reveal, BlockTreeNode {
                block_root: node.root,
                parent_root: node.parent_root,
                slot: node.slot,
                participated_votes,
                total_votes,
            }));
        }

        rows.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    /// As [`BeaconChain::block_tree`], restricted to `from ..= to`. Fails `InvalidRange` if
    /// `to < from`, matching §8 scenario 6.
    pub fn block_tree_by_slots(&self, from: Slot, to: Slot) -> Result<Vec<BlockTreeNode>, Error> {
        if to < from {
            return Err(Error::InvalidRange);
        }
        Ok(self
            .block_tree()?
            .into_iter()
            .filter(|node| node.slot >= from && node.slot <= to)
            .collect())
    }

    fn proposer_effective_balance_at(&self, block_root: Hash256, slot: Slot) -> Result<u64, Error> {
        let state = self
            .store
            .get_historical_state(&block_root)?
            .ok_or(Error::MissingHead)?;
        let proposer_index = state
            .get_beacon_proposer_index(slot, &self.spec)
            .map_err(|_| Error::MissingHead)?;
        Ok(state
            .validators
            .get(proposer_index)
            .map(|v| v.effective_balance)
            .unwrap_or(0))
    }
}
