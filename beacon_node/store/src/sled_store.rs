use crate::{errors::Error, keys, metrics, Store};
use parking_lot::Mutex;
use ssz::{Decode, Encode};
use std::path::Path;
use types::{BeaconState, Deposit, Hash256, SignedBeaconBlock, Slot};

/// A [`Store`] backed by `sled`, an embedded, crash-safe KV engine. Each bucket in §6's storage
/// layout is a separate `sled::Tree`; writes are serialized through `write_lock` so that
/// `update_chain_head`'s block/state/pointer triple is never observed half-written even though
/// `sled` itself only guarantees atomicity within a single tree.
pub struct SledStore {
    blocks: sled::Tree,
    states: sled::Tree,
    historical_states: sled::Tree,
    deposits: sled::Tree,
    pending_deposits: sled::Tree,
    singletons: sled::Tree,
    write_lock: Mutex<()>,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let db = sled::open(path)?;
        Ok(SledStore {
            blocks: db.open_tree("blocks")?,
            states: db.open_tree("states")?,
            historical_states: db.open_tree("historical_states")?,
            deposits: db.open_tree("deposits")?,
            pending_deposits: db.open_tree("pending_deposits")?,
            singletons: db.open_tree("singletons")?,
            write_lock: Mutex::new(()),
        })
    }

    fn get_ssz<T: Decode>(tree: &sled::Tree, key: impl AsRef<[u8]>) -> Result<Option<T>, Error> {
        tree.get(key)?
            .map(|bytes| T::from_ssz_bytes(&bytes).map_err(Error::from))
            .transpose()
    }
}

impl Store for SledStore {
    fn save_block(&self, block: &SignedBeaconBlock) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        metrics::inc_counter_vec(&metrics::STORE_WRITE_COUNT, &["blocks"]);
        self.blocks.insert(
            &keys::root_key(&block.message.canonical_root())[..],
            block.as_ssz_bytes(),
        )?;
        Ok(())
    }

    fn get_block(&self, root: &Hash256) -> Result<Option<SignedBeaconBlock>, Error> {
        metrics::inc_counter_vec(&metrics::STORE_READ_COUNT, &["blocks"]);
        Self::get_ssz(&self.blocks, &keys::root_key(root)[..])
    }

    fn save_state(&self, slot: Slot, state: &BeaconState) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        metrics::inc_counter_vec(&metrics::STORE_WRITE_COUNT, &["states"]);
        self.states
            .insert(&keys::slot_key(slot)[..], state.as_ssz_bytes())?;
        Ok(())
    }

    fn get_state(&self, slot: Slot) -> Result<Option<BeaconState>, Error> {
        metrics::inc_counter_vec(&metrics::STORE_READ_COUNT, &["states"]);
        Self::get_ssz(&self.states, &keys::slot_key(slot)[..])
    }

    fn save_historical_state(&self, state: &BeaconState, block_root: Hash256) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        metrics::inc_counter_vec(&metrics::STORE_WRITE_COUNT, &["historical_states"]);
        self.historical_states
            .insert(&keys::root_key(&block_root)[..], state.as_ssz_bytes())?;
        Ok(())
    }

    fn get_historical_state(&self, block_root: &Hash256) -> Result<Option<BeaconState>, Error> {
        metrics::inc_counter_vec(&metrics::STORE_READ_COUNT, &["historical_states"]);
        Self::get_ssz(&self.historical_states, &keys::root_key(block_root)[..])
    }

    fn save_justified_block(&self, block: &SignedBeaconBlock) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .insert(keys::JUSTIFIED_BLOCK_KEY, block.as_ssz_bytes())?;
        Ok(())
    }

    fn get_justified_block(&self) -> Result<Option<SignedBeaconBlock>, Error> {
        Self::get_ssz(&self.singletons, keys::JUSTIFIED_BLOCK_KEY)
    }

    fn save_justified_state(&self, state: &BeaconState) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .insert(keys::JUSTIFIED_STATE_KEY, state.as_ssz_bytes())?;
        Ok(())
    }

    fn get_justified_state(&self) -> Result<Option<BeaconState>, Error> {
        Self::get_ssz(&self.singletons, keys::JUSTIFIED_STATE_KEY)
    }

    fn save_finalized_block(&self, block: &SignedBeaconBlock) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .insert(keys::FINALIZED_BLOCK_KEY, block.as_ssz_bytes())?;
        Ok(())
    }

    fn get_finalized_block(&self) -> Result<Option<SignedBeaconBlock>, Error> {
        Self::get_ssz(&self.singletons, keys::FINALIZED_BLOCK_KEY)
    }

    fn save_finalized_state(&self, state: &BeaconState) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        self.singletons
            .insert(keys::FINALIZED_STATE_KEY, state.as_ssz_bytes())?;
        Ok(())
    }

    fn get_finalized_state(&self) -> Result<Option<BeaconState>, Error> {
        Self::get_ssz(&self.singletons, keys::FINALIZED_STATE_KEY)
    }

    fn update_chain_head(
        &self,
        block: &SignedBeaconBlock,
        post_state: &BeaconState,
    ) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let root = block.message.canonical_root();
        self.blocks
            .insert(&keys::root_key(&root)[..], block.as_ssz_bytes())?;
        self.states.insert(
            &keys::slot_key(block.message.slot)[..],
            post_state.as_ssz_bytes(),
        )?;
        self.singletons
            .insert(keys::CHAIN_HEAD_KEY, root.as_bytes())?;
        Ok(())
    }

    fn get_chain_head_root(&self) -> Result<Option<Hash256>, Error> {
        Ok(self
            .singletons
            .get(keys::CHAIN_HEAD_KEY)?
            .map(|bytes| Hash256::from_slice(&bytes)))
    }

    fn insert_deposit(&self, deposit: &Deposit, block_number: u64) -> Result<u64, Error> {
        let _guard = self.write_lock.lock();
        let index = self
            .singletons
            .get(keys::DEPOSIT_LOG_LEN_KEY)?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap()))
            .unwrap_or(0);

        let mut value = deposit.as_ssz_bytes();
        value.extend_from_slice(&block_number.to_be_bytes());
        self.deposits.insert(&keys::index_key(index)[..], value)?;
        self.singletons
            .insert(keys::DEPOSIT_LOG_LEN_KEY, &(index + 1).to_be_bytes()[..])?;
        Ok(index)
    }

    fn get_deposit(&self, index: u64) -> Result<Option<Deposit>, Error> {
        self.deposits
            .get(&keys::index_key(index)[..])?
            .map(|bytes| {
                let (deposit_bytes, _) = split_deposit_record(&bytes);
                Deposit::from_ssz_bytes(deposit_bytes).map_err(Error::from)
            })
            .transpose()
    }

    fn deposit_log_len(&self) -> Result<u64, Error> {
        Ok(self
            .singletons
            .get(keys::DEPOSIT_LOG_LEN_KEY)?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap()))
            .unwrap_or(0))
    }

    fn insert_pending_deposit(
        &self,
        index: u64,
        deposit: &Deposit,
        block_number: u64,
    ) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        let mut value = deposit.as_ssz_bytes();
        value.extend_from_slice(&block_number.to_be_bytes());
        self.pending_deposits
            .insert(&keys::index_key(index)[..], value)?;
        Ok(())
    }

    fn remove_pending_deposits(&self, indices: &[u64]) -> Result<(), Error> {
        let _guard = self.write_lock.lock();
        for index in indices {
            self.pending_deposits.remove(&keys::index_key(*index)[..])?;
        }
        Ok(())
    }

    fn pending_deposits(
        &self,
        up_to_block_number: u64,
        min_index: u64,
        max_results: usize,
    ) -> Result<Vec<(u64, Deposit)>, Error> {
        let mut results = Vec::new();
        for entry in self.pending_deposits.range(&keys::index_key(min_index)[..]..) {
            let (key, value) = entry?;
            let index = u64::from_be_bytes(key.as_ref().try_into().unwrap());
            let (deposit_bytes, block_number) = split_deposit_record(&value);
            if block_number > up_to_block_number {
                continue;
            }
            results.push((index, Deposit::from_ssz_bytes(deposit_bytes)?));
            if results.len() >= max_results {
                break;
            }
        }
        Ok(results)
    }
}

fn split_deposit_record(bytes: &sled::IVec) -> (&[u8], u64) {
    let (deposit_bytes, block_number_bytes) = bytes.split_at(bytes.len() - 8);
    let block_number = u64::from_be_bytes(block_number_bytes.try_into().unwrap());
    (deposit_bytes, block_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BeaconBlock, SignatureBytes};

    #[test]
    fn round_trips_a_block() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        let mut message = BeaconBlock::empty();
        message.slot = Slot::new(3);
        let block = SignedBeaconBlock {
            message,
            signature: SignatureBytes::default(),
        };
        let root = block.message.canonical_root();

        store.save_block(&block).unwrap();
        let fetched = store.get_block(&root).unwrap().unwrap();
        assert_eq!(fetched, block);
    }

    #[test]
    fn deposit_log_assigns_sequential_indices() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        let deposit = Deposit {
            proof: vec![],
            data: Default::default(),
        };

        let first = store.insert_deposit(&deposit, 100).unwrap();
        let second = store.insert_deposit(&deposit, 101).unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(store.deposit_log_len().unwrap(), 2);
    }
}
