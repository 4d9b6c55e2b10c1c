mod errors;
mod keys;
mod memory_store;
mod metrics;
mod sled_store;

pub use errors::Error;
pub use memory_store::MemoryStore;
pub use sled_store::SledStore;

use types::{BeaconState, Deposit, Hash256, SignedBeaconBlock, Slot};

/// The transactional contract of C5. Implementors guard their backing storage with a single
/// writer lock (document on each method that mutates) while allowing concurrent reads; callers
/// never see a torn write.
pub trait Store: Sync + Send {
    fn save_block(&self, block: &SignedBeaconBlock) -> Result<(), Error>;
    fn get_block(&self, root: &Hash256) -> Result<Option<SignedBeaconBlock>, Error>;

    fn save_state(&self, slot: Slot, state: &BeaconState) -> Result<(), Error>;
    fn get_state(&self, slot: Slot) -> Result<Option<BeaconState>, Error>;

    fn save_historical_state(&self, state: &BeaconState, block_root: Hash256) -> Result<(), Error>;
    fn get_historical_state(&self, block_root: &Hash256) -> Result<Option<BeaconState>, Error>;

    fn save_justified_block(&self, block: &SignedBeaconBlock) -> Result<(), Error>;
    fn get_justified_block(&self) -> Result<Option<SignedBeaconBlock>, Error>;
    fn save_justified_state(&self, state: &BeaconState) -> Result<(), Error>;
    fn get_justified_state(&self) -> Result<Option<BeaconState>, Error>;

    fn save_finalized_block(&self, block: &SignedBeaconBlock) -> Result<(), Error>;
    fn get_finalized_block(&self) -> Result<Option<SignedBeaconBlock>, Error>;
    fn save_finalized_state(&self, state: &BeaconState) -> Result<(), Error>;
    fn get_finalized_state(&self) -> Result<Option<BeaconState>, Error>;

    /// Atomically records `block` as the chain head: persists the block itself, the
    /// post-state keyed by its slot, and the `chain_head` singleton pointer, in one write.
    fn update_chain_head(
        &self,
        block: &SignedBeaconBlock,
        post_state: &BeaconState,
    ) -> Result<(), Error>;
    fn get_chain_head_root(&self) -> Result<Option<Hash256>, Error>;

    /// Appends `deposit` to the by-index log at the log's current length, returning the index
    /// it was assigned.
    fn insert_deposit(&self, deposit: &Deposit, block_number: u64) -> Result<u64, Error>;
    fn get_deposit(&self, index: u64) -> Result<Option<Deposit>, Error>;
    fn deposit_log_len(&self) -> Result<u64, Error>;

    fn insert_pending_deposit(
        &self,
        index: u64,
        deposit: &Deposit,
        block_number: u64,
    ) -> Result<(), Error>;
    fn remove_pending_deposits(&self, indices: &[u64]) -> Result<(), Error>;

    /// Returns pending deposits with `block_number <= up_to_block_number` and
    /// `index >= min_index`, in ascending merkle-index order, capped at `max_results`. Callers
    /// in `beacon_node/eth1` pass `up_to_block_number = latest_eth1_block - Eth1FollowDistance`
    /// and `min_index = state.eth1_deposit_index`, keeping this crate free of any `ChainSpec`
    /// dependency.
    fn pending_deposits(
        &self,
        up_to_block_number: u64,
        min_index: u64,
        max_results: usize,
    ) -> Result<Vec<(u64, Deposit)>, Error>;
}
