use crate::chain_config::ChainConfig;
use crate::errors::Error;
use crate::events::ChainEvents;
use crate::metrics;
use eth1::Eth1DepositFeed;
use fork_choice::{AttestationTarget, ForkChoice};
use operation_pool::OperationPool;
use parking_lot::Mutex;
use state_processing::{compute_state_root as run_compute_state_root, execute, BlockSignatureStrategy};
use std::sync::Arc;
use store::Store;
use tree_hash::TreeHash;
use types::{
    Attestation, BeaconBlock, BeaconState, ChainSpec, Deposit, Eth1Data, Hash256,
    SignedBeaconBlock, Slot,
};

/// Ties together C4 (state transition), C5 (store), C6 (fork choice) and C7 (operation pool)
/// into the single object the RPC layer is a thin binding over. One instance per running node.
pub struct BeaconChain {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) fork_choice: Mutex<ForkChoice>,
    pub(crate) op_pool: OperationPool,
    pub(crate) events: ChainEvents,
    pub(crate) eth1_feed: Arc<dyn Eth1DepositFeed>,
    pub(crate) spec: ChainSpec,
    pub(crate) config: ChainConfig,
    pub(crate) log: slog::Logger,
}

impl BeaconChain {
    /// Seals `genesis_state` into a genesis block, persists both as the justified/finalized/head
    /// triple, and starts fork choice rooted there. `genesis_state` is ordinarily the output of
    /// [`genesis::assemble_genesis_state`] or a loaded [`genesis::GenesisFile`].
    pub fn from_genesis(
        genesis_state: BeaconState,
        store: Arc<dyn Store>,
        eth1_feed: Arc<dyn Eth1DepositFeed>,
        spec: ChainSpec,
        config: ChainConfig,
        log: slog::Logger,
    ) -> Result<Self, Error> {
        let mut genesis_block = BeaconBlock::empty();
        genesis_block.slot = spec.genesis_slot;
        genesis_block.state_root = Hash256::from_slice(&genesis_state.tree_hash_root()[..]);
        let signed_genesis_block = SignedBeaconBlock {
            message: genesis_block.clone(),
            signature: Default::default(),
        };
        let genesis_root = genesis_block.canonical_root();

        store.save_block(&signed_genesis_block)?;
        store.save_state(spec.genesis_slot, &genesis_state)?;
        store.save_historical_state(&genesis_state, genesis_root)?;
        store.save_justified_block(&signed_genesis_block)?;
        store.save_justified_state(&genesis_state)?;
        store.save_finalized_block(&signed_genesis_block)?;
        store.save_finalized_state(&genesis_state)?;
        store.update_chain_head(&signed_genesis_block, &genesis_state)?;

        let fork_choice = ForkChoice::new(genesis_root, spec.genesis_slot);

        Ok(BeaconChain {
            store,
            fork_choice: Mutex::new(fork_choice),
            op_pool: OperationPool::new(),
            events: ChainEvents::new(genesis_root),
            eth1_feed,
            spec,
            config,
            log,
        })
    }

    pub fn chain_events(&self) -> &ChainEvents {
        &self.events
    }

    pub fn spec(&self) -> &ChainSpec {
        &self.spec
    }

    /// Recomputes the fork-choice head, weighting each validator's latest target by its
    /// effective balance as recorded in the justified state (§4.6).
    pub fn canonical_head(&self) -> Result<Hash256, Error> {
        let justified_state = self
            .store
            .get_justified_state()?
            .ok_or(Error::MissingHead)?;
        let fork_choice = self.fork_choice.lock();
        let head = fork_choice.head(|validator_index| {
            justified_state
                .validators
                .get(validator_index as usize)
                .map(|v| v.effective_balance)
                .unwrap_or(0)
        })?;
        Ok(head)
    }

    /// The post-state of the current chain head, as recorded by the last `update_chain_head`.
    pub fn head_state(&self) -> Result<BeaconState, Error> {
        let head_root = self.store.get_chain_head_root()?.ok_or(Error::MissingHead)?;
        self.store
            .get_historical_state(&head_root)?
            .ok_or(Error::MissingHead)
    }

    /// `ProposeBlock`: verifies `signed_block` by running `execute` against its parent's
    /// historical state, persists the result in a single store transaction, and updates fork
    /// choice and the announced head. Returns the block's canonical root.
    pub fn process_block(&self, signed_block: SignedBeaconBlock) -> Result<Hash256, Error> {
        lighthouse_metrics::inc_counter(&metrics::BLOCK_PROCESSING_REQUESTS);
        let _timer = lighthouse_metrics::start_timer(&metrics::BLOCK_PROCESSING_TIMES);

        let block = &signed_block.message;
        let parent_root = block.parent_root;
        let mut state = self
            .store
            .get_historical_state(&parent_root)?
            .ok_or(Error::MissingHead)?;

        if let Some(max_skip) = self.config.import_max_skip_slots {
            let skipped = block.slot.as_u64().saturating_sub(state.slot.as_u64());
            if skipped > max_skip {
                return Err(Error::ImportSkipTooLarge { skipped, max: max_skip });
            }
        }

        execute(&mut state, block, BlockSignatureStrategy::VerifyIndividual, &self.spec)?;

        let block_root = block.canonical_root();
        self.store.save_block(&signed_block)?;
        self.store.save_state(block.slot, &state)?;
        self.store.save_historical_state(&state, block_root)?;
        self.store.update_chain_head(&signed_block, &state)?;

        {
            let mut fork_choice = self.fork_choice.lock();
            fork_choice.on_block(block_root, parent_root, block.slot)?;
        }

        let new_head = self.canonical_head()?;
        self.events.announce_head(new_head);

        lighthouse_metrics::inc_counter(&metrics::BLOCK_PROCESSING_SUCCESSES);
        lighthouse_metrics::set_gauge(&metrics::FORK_CHOICE_HEAD_SLOT, block.slot.as_u64() as i64);
        slog::debug!(self.log, "imported block"; "root" => ?block_root, "slot" => block.slot.as_u64());

        Ok(block_root)
    }

    /// `ComputeStateRoot`: runs `execute` on a defensive copy of `block`'s parent state and
    /// returns the resulting root, without touching the store.
    pub fn compute_state_root(&self, block: &BeaconBlock) -> Result<Hash256, Error> {
        let parent_state = self
            .store
            .get_historical_state(&block.parent_root)?
            .ok_or(Error::MissingHead)?;
        Ok(run_compute_state_root(&parent_state, block, &self.spec)?)
    }

    /// `AttestHead`: inserts into the operation pool, advances each attesting validator's
    /// fork-choice target, and delivers the aggregate to the `LatestAttestation` stream. Returns
    /// `hash_tree_root(attestation)`.
    pub async fn process_attestation(&self, attestation: Attestation) -> Result<Hash256, Error> {
        lighthouse_metrics::inc_counter(&metrics::ATTESTATION_PROCESSING_REQUESTS);

        let head_state = self.head_state()?;
        self.op_pool
            .insert_attestation(attestation.clone(), &head_state.fork)?;

        let committee = head_state
            .get_beacon_committee(attestation.data.slot, attestation.data.shard, &self.spec)
            .map_err(|_| Error::MissingHead)?;
        let target_parent_root = self
            .store
            .get_block(&attestation.data.beacon_block_root)?
            .map(|b| b.message.parent_root)
            .unwrap_or_else(Hash256::zero);
        let current_slot = head_state.slot;

        {
            let mut fork_choice = self.fork_choice.lock();
            for (bit_index, &validator_index) in committee.iter().enumerate() {
                if attestation.aggregation_bits.get(bit_index).copied().unwrap_or(false) {
                    fork_choice.on_attestation(
                        validator_index as u64,
                        AttestationTarget {
                            slot: attestation.data.slot,
                            block_root: attestation.data.beacon_block_root,
                            parent_root: target_parent_root,
                        },
                        current_slot,
                    );
                }
            }
        }

        self.events.deliver_attestation(attestation.clone()).await;

        Ok(Hash256::from_slice(&attestation.tree_hash_root()[..]))
    }

    /// `PendingDeposits`: deposits past the follow window relative to the ETH1 chain's current
    /// tip, filtered to the head state's deposit index and capped at `spec.max_deposits` (§4.5).
    pub async fn pending_deposits(&self) -> Result<Vec<Deposit>, Error> {
        let latest = self.eth1_feed.latest_block_number().await?;
        let up_to_block = latest.saturating_sub(self.spec.eth1_follow_distance);
        let head_state = self.head_state()?;

        let deposits = self.store.pending_deposits(
            up_to_block,
            head_state.eth1_deposit_index,
            self.spec.max_deposits,
        )?;
        Ok(deposits.into_iter().map(|(_, deposit)| deposit).collect())
    }

    /// `Eth1Data`: delegates to [`eth1::select_eth1_data`], using the head state's latest
    /// committed `eth1_data.deposit_root` as the "current accumulator root" fallback when no
    /// votes have been cast yet this period (see DESIGN.md for why this is the right proxy).
    pub async fn eth1_data(&self) -> Result<Eth1Data, Error> {
        let head_state = self.head_state()?;
        let current_deposit_root = head_state.eth1_data.deposit_root;
        Ok(eth1::select_eth1_data(&head_state, &*self.eth1_feed, current_deposit_root, &self.spec).await?)
    }

    /// `ProposerIndex`: the proposer selected for `slot` by the head state's committee shuffle.
    pub fn proposer_index(&self, slot: Slot) -> Result<u64, Error> {
        let head_state = self.head_state()?;
        head_state
            .get_beacon_proposer_index(slot, &self.spec)
            .map(|i| i as u64)
            .map_err(|_| Error::MissingHead)
    }
}
