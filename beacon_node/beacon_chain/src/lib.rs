mod beacon_chain;
mod block_tree;
mod chain_config;
mod duties;
mod errors;
mod events;
mod metrics;

pub use crate::beacon_chain::BeaconChain;
pub use block_tree::BlockTreeNode;
pub use chain_config::{ChainConfig, DEFAULT_IMPORT_MAX_SKIP_SLOTS};
pub use duties::{CommitteeAssignment, ValidatorPerformance, ValidatorStatus};
pub use errors::Error;
pub use events::ChainEvents;

#[cfg(test)]
mod tests {
    use super::*;
    use eth1::Eth1DepositFeed;
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::Arc;
    use store::{MemoryStore, Store as _};
    use types::{BeaconState, ChainSpec, Eth1Data, Hash256, Validator};

    struct StubFeed;

    impl Eth1DepositFeed for StubFeed {
        fn latest_block_number(&self) -> BoxFuture<'_, Result<u64, eth1::Error>> {
            async { Ok(0) }.boxed()
        }

        fn block_hash_at_height(
            &self,
            _height: u64,
        ) -> BoxFuture<'_, Result<Option<Hash256>, eth1::Error>> {
            async { Ok(Some(Hash256::zero())) }.boxed()
        }

        fn block_number_of_hash(
            &self,
            _hash: Hash256,
        ) -> BoxFuture<'_, Result<Option<u64>, eth1::Error>> {
            async { Ok(Some(0)) }.boxed()
        }

        fn block_timestamp_at_height(
            &self,
            _height: u64,
        ) -> BoxFuture<'_, Result<Option<u64>, eth1::Error>> {
            async { Ok(Some(0)) }.boxed()
        }

        fn deposit_logs_since(
            &self,
            _from_index: u64,
        ) -> BoxFuture<'_, Result<Vec<(u64, types::Deposit, u64)>, eth1::Error>> {
            async { Ok(vec![]) }.boxed()
        }
    }

    fn test_chain() -> BeaconChain {
        let spec = ChainSpec::minimal();
        let validator = Validator {
            pubkey: Default::default(),
            withdrawal_credentials: Hash256::zero(),
            effective_balance: spec.max_effective_balance,
            slashed: false,
            activation_eligibility_epoch: types::Epoch::new(0),
            activation_epoch: types::Epoch::new(0),
            exit_epoch: spec.far_future_epoch,
            withdrawable_epoch: spec.far_future_epoch,
        };
        let genesis_state = BeaconState::genesis(
            0,
            Eth1Data::default(),
            vec![validator],
            vec![spec.max_effective_balance],
            &spec,
        );
        let log = slog::Logger::root(slog::Discard, slog::o!());

        BeaconChain::from_genesis(
            genesis_state,
            Arc::new(MemoryStore::new()),
            Arc::new(StubFeed),
            spec,
            ChainConfig::default(),
            log,
        )
        .unwrap()
    }

    #[test]
    fn genesis_head_is_the_genesis_block() {
        let chain = test_chain();
        let head = chain.canonical_head().unwrap();
        let stored_head = chain.store.get_chain_head_root().unwrap().unwrap();
        assert_eq!(head, stored_head);
    }

    #[test]
    fn block_tree_excludes_the_finalized_anchor_at_genesis() {
        let chain = test_chain();
        let nodes = chain.block_tree().unwrap();
        assert_eq!(nodes.len(), 0);
    }
}
