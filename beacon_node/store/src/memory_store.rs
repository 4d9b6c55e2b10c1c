use crate::{errors::Error, keys, metrics, Store};
use parking_lot::{Mutex, RwLock};
use ssz::{Decode, Encode};
use std::collections::BTreeMap;
use types::{BeaconState, Deposit, Hash256, SignedBeaconBlock, Slot};

/// An in-memory [`Store`], kept alongside [`crate::SledStore`] for fast unit tests that don't
/// need a real `sled` database on disk, matching the reference client's habit of testing chain
/// logic against an in-memory backend.
#[derive(Default)]
pub struct MemoryStore {
    blocks: RwLock<BTreeMap<[u8; 32], Vec<u8>>>,
    states: RwLock<BTreeMap<[u8; 8], Vec<u8>>>,
    historical_states: RwLock<BTreeMap<[u8; 32], Vec<u8>>>,
    deposits: RwLock<BTreeMap<[u8; 8], (Vec<u8>, u64)>>,
    pending_deposits: RwLock<BTreeMap<[u8; 8], (Vec<u8>, u64)>>,
    singletons: RwLock<BTreeMap<&'static [u8], Vec<u8>>>,
    deposit_log_len: RwLock<u64>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl Store for MemoryStore {
    fn save_block(&self, block: &SignedBeaconBlock) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        metrics::inc_counter_vec(&metrics::STORE_WRITE_COUNT, &["blocks"]);
        self.blocks.write().insert(
            keys::root_key(&block.message.canonical_root()),
            block.as_ssz_bytes(),
        );
        Ok(())
    }

    fn get_block(&self, root: &Hash256) -> Result<Option<SignedBeaconBlock>, Error> {
        metrics::inc_counter_vec(&metrics::STORE_READ_COUNT, &["blocks"]);
        self.blocks
            .read()
            .get(&keys::root_key(root))
            .map(|bytes| SignedBeaconBlock::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn save_state(&self, slot: Slot, state: &BeaconState) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        metrics::inc_counter_vec(&metrics::STORE_WRITE_COUNT, &["states"]);
        self.states
            .write()
            .insert(keys::slot_key(slot), state.as_ssz_bytes());
        Ok(())
    }

    fn get_state(&self, slot: Slot) -> Result<Option<BeaconState>, Error> {
        metrics::inc_counter_vec(&metrics::STORE_READ_COUNT, &["states"]);
        self.states
            .read()
            .get(&keys::slot_key(slot))
            .map(|bytes| BeaconState::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn save_historical_state(&self, state: &BeaconState, block_root: Hash256) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        metrics::inc_counter_vec(&metrics::STORE_WRITE_COUNT, &["historical_states"]);
        self.historical_states
            .write()
            .insert(keys::root_key(&block_root), state.as_ssz_bytes());
        Ok(())
    }

    fn get_historical_state(&self, block_root: &Hash256) -> Result<Option<BeaconState>, Error> {
        metrics::inc_counter_vec(&metrics::STORE_READ_COUNT, &["historical_states"]);
        self.historical_states
            .read()
            .get(&keys::root_key(block_root))
            .map(|bytes| BeaconState::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn save_justified_block(&self, block: &SignedBeaconBlock) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .write()
            .insert(keys::JUSTIFIED_BLOCK_KEY, block.as_ssz_bytes());
        Ok(())
    }

    fn get_justified_block(&self) -> Result<Option<SignedBeaconBlock>, Error> {
        self.singletons
            .read()
            .get(keys::JUSTIFIED_BLOCK_KEY)
            .map(|bytes| SignedBeaconBlock::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn save_justified_state(&self, state: &BeaconState) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .write()
            .insert(keys::JUSTIFIED_STATE_KEY, state.as_ssz_bytes());
        Ok(())
    }

    fn get_justified_state(&self) -> Result<Option<BeaconState>, Error> {
        self.singletons
            .read()
            .get(keys::JUSTIFIED_STATE_KEY)
            .map(|bytes| BeaconState::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn save_finalized_block(&self, block: &SignedBeaconBlock) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .write()
            .insert(keys::FINALIZED_BLOCK_KEY, block.as_ssz_bytes());
        Ok(())
    }

    fn get_finalized_block(&self) -> Result<Option<SignedBeaconBlock>, Error> {
        self.singletons
            .read()
            .get(keys::FINALIZED_BLOCK_KEY)
            .map(|bytes| SignedBeaconBlock::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn save_finalized_state(&self, state: &BeaconState) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .write()
            .insert(keys::FINALIZED_STATE_KEY, state.as_ssz_bytes());
        Ok(())
    }

    fn get_finalized_state(&self) -> Result<Option<BeaconState>, Error> {
        self.singletons
            .read()
            .get(keys::FINALIZED_STATE_KEY)
            .map(|bytes| BeaconState::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn update_chain_head(
        &self,
        block: &SignedBeaconBlock,
        post_state: &BeaconState,
    ) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let root = block.message.canonical_root();
        self.blocks
            .write()
            .insert(keys::root_key(&root), block.as_ssz_bytes());
        self.states
            .write()
            .insert(keys::slot_key(block.message.slot), post_state.as_ssz_bytes());
        self.singletons
            .write()
            .insert(keys::CHAIN_HEAD_KEY, root.as_bytes().to_vec());
        Ok(())
    }

    fn get_chain_head_root(&self) -> Result<Option<Hash256>, Error> {
        Ok(self
            .singletons
            .read()
            .get(keys::CHAIN_HEAD_KEY)
            .map(|bytes| Hash256::from_slice(bytes)))
    }

    fn insert_deposit(&self, deposit: &Deposit, block_number: u64) -> Result<u64, Error> {
        let _guard = self.write_lock.lock();
        let mut len = self.deposit_log_len.write();
        let index = *len;
        self.deposits.write().insert(
            keys::index_key(index),
            (deposit.as_ssz_bytes(), block_number),
        );
        *len += 1;
        Ok(index)
    }

    fn get_deposit(&self, index: u64) -> Result<Option<Deposit>, Error> {
        self.deposits
            .read()
            .get(&keys::index_key(index))
            .map(|(bytes, _)| Deposit::from_ssz_bytes(bytes).map_err(Error::from))
            .transpose()
    }

    fn deposit_log_len(&self) -> Result<u64, Error> {
        Ok(*self.deposit_log_len.read())
    }

    fn insert_pending_deposit(
        &self,
        index: u64,
        deposit: &Deposit,
        block_number: u64,
    ) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.pending_deposits.write().insert(
            keys::index_key(index),
            (deposit.as_ssz_bytes(), block_number),
        );
        Ok(())
    }

    fn remove_pending_deposits(&self, indices: &[u64]) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let mut pending = self.pending_deposits.write();
        for index in indices {
            pending.remove(&keys::index_key(*index));
        }
        Ok(())
    }

    fn pending_deposits(
        &self,
        up_to_block_number: u64,
        min_index: u64,
        max_results: usize,
    ) -> Result<Vec<(u64, Deposit)>, Error> {
        let pending = self.pending_deposits.read();
        let mut results = Vec::new();
        for (key, (bytes, block_number)) in pending.iter() {
            let index = u64::from_be_bytes(*key);
            if index < min_index || *block_number > up_to_block_number {
                continue;
            }
            let deposit = Deposit::from_ssz_bytes(bytes)?;
            results.push((index, deposit));
            if results.len() >= max_results {
                break;
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BeaconBlock, SignatureBytes};

    fn signed_block(slot: u64) -> SignedBeaconBlock {
        let mut message = BeaconBlock::empty();
        message.slot = Slot::new(slot);
        SignedBeaconBlock {
            message,
            signature: SignatureBytes::default(),
        }
    }

    #[test]
    fn round_trips_a_block() {
        let store = MemoryStore::new();
        let block = signed_block(7);
        let root = block.message.canonical_root();
        store.save_block(&block).unwrap();
        let fetched = store.get_block(&root).unwrap().unwrap();
        assert_eq!(fetched, block);
    }

    #[test]
    fn pending_deposits_respects_window_and_index() {
        let store = MemoryStore::new();
        for i in 0..4u64 {
            let deposit = Deposit {
                proof: vec![],
                data: Default::default(),
            };
            store.insert_pending_deposit(i, &deposit, i).unwrap();
        }

        let result = store.pending_deposits(1, 2, 10).unwrap();
        let indices: Vec<u64> = result.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![2]);
    }

    #[test]
    fn pending_deposits_caps_results() {
        let store = MemoryStore::new();
        for i in 0..5u64 {
            let deposit = Deposit {
                proof: vec![],
                data: Default::default(),
            };
            store.insert_pending_deposit(i, &deposit, 0).unwrap();
        }
        let result = store.pending_deposits(100, 0, 2).unwrap();
        assert_eq!(result.len(), 2);
    }
}
