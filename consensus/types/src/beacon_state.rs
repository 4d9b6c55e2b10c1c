use crate::{
    BeaconBlockHeader, ChainSpec, Checkpoint, Epoch, Eth1Data, Fork, Hash256, PendingAttestation,
    Slot, Validator,
};
use safe_arith::{ArithError, SafeArith};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use swap_or_not_shuffle::shuffle_list;
use tree_hash_derive::TreeHash;

#[derive(Debug, PartialEq)]
pub enum BeaconStateError {
    UnknownValidator(usize),
    InsufficientValidators,
    InsufficientRandaoMixes,
    InsufficientHistoricalRoots,
    EpochOutOfBounds,
    ShardOutOfBounds,
    Arith(ArithError),
}

impl From<ArithError> for BeaconStateError {
    fn from(e: ArithError) -> Self {
        BeaconStateError::Arith(e)
    }
}

/// The full consensus-critical state of the chain at some slot.
///
/// Field order matches the registry groups spec.md lists them in; accessor methods below
/// implement the committee/shuffling math from C3 against `validators`/`randao_mixes` rather
/// than a separate committee-cache type, since this core has no per-epoch caching requirement
/// beyond what fork choice itself keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconState {
    // Misc
    pub slot: Slot,
    pub genesis_time: u64,
    pub fork: Fork,

    // Validator registry
    pub validators: Vec<Validator>,
    pub balances: Vec<u64>,

    // Randomness
    pub randao_mixes: Vec<Hash256>,

    // Roots history
    pub historical_block_roots: Vec<Hash256>,
    pub historical_state_roots: Vec<Hash256>,

    // Eth1
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: Vec<Eth1Data>,
    pub eth1_deposit_index: u64,

    // Attestations awaiting epoch processing
    pub previous_epoch_attestations: Vec<PendingAttestation>,
    pub current_epoch_attestations: Vec<PendingAttestation>,

    // Finality
    pub justification_bits: Vec<bool>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // Most recent header, state_root zeroed until sealed by the next block's `compute_state_root`
    pub latest_block_header: BeaconBlockHeader,
}

impl BeaconState {
    pub fn genesis(
        genesis_time: u64,
        eth1_data: Eth1Data,
        validators: Vec<Validator>,
        balances: Vec<u64>,
        spec: &ChainSpec,
    ) -> Self {
        let randao_mixes = vec![spec.zero_hash; spec.epochs_per_eth1_voting_period as usize * spec.slots_per_epoch as usize];
        let mut state = BeaconState {
            slot: spec.genesis_slot,
            genesis_time,
            fork: Fork::genesis(Epoch::new(0)),
            validators,
            balances,
            randao_mixes,
            historical_block_roots: vec![spec.zero_hash; spec.slots_per_historical_root],
            historical_state_roots: vec![spec.zero_hash; spec.slots_per_historical_root],
            eth1_data,
            eth1_data_votes: vec![],
            eth1_deposit_index: 0,
            previous_epoch_attestations: vec![],
            current_epoch_attestations: vec![],
            justification_bits: vec![false; 4],
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
            latest_block_header: BeaconBlockHeader::default(),
        };
        state.latest_block_header.state_root = Hash256::zero();
        state
    }

    pub fn current_epoch(&self, spec: &ChainSpec) -> Epoch {
        self.slot.epoch(spec.slots_per_epoch)
    }

    pub fn previous_epoch(&self, spec: &ChainSpec) -> Epoch {
        let current = self.current_epoch(spec);
        if current == Epoch::new(0) {
            current
        } else {
            current - 1
        }
    }

    /// Indices of validators active at `epoch`, in registry order.
    pub fn get_active_validator_indices(&self, epoch: Epoch) -> Vec<usize> {
        self.validators
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active_at(epoch))
            .map(|(i, _)| i)
            .collect()
    }

    fn randao_mix(&self, epoch: Epoch, spec: &ChainSpec) -> Result<Hash256, BeaconStateError> {
        let len = self.randao_mixes.len() as u64;
        let index = epoch.as_u64() % len;
        self.randao_mixes
            .get(index as usize)
            .copied()
            .ok_or(BeaconStateError::InsufficientRandaoMixes)
    }

    /// The shuffling seed for `epoch`, mixing the randao mix two epochs prior with the epoch
    /// number itself, per C3.
    pub fn get_seed(&self, epoch: Epoch, spec: &ChainSpec) -> Result<[u8; 32], BeaconStateError> {
        let mix_epoch = epoch.saturating_sub(Epoch::new(2));
        let mix = self.randao_mix(mix_epoch, spec)?;
        let mut input = Vec::with_capacity(40);
        input.extend_from_slice(&epoch.as_u64().to_le_bytes());
        input.extend_from_slice(mix.as_bytes());
        let hashed = eth2_hashing::hash(&input);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hashed);
        Ok(out)
    }

    pub fn get_committee_count_at_slot(
        &self,
        slot: Slot,
        spec: &ChainSpec,
    ) -> Result<usize, BeaconStateError> {
        let epoch = slot.epoch(spec.slots_per_epoch);
        let active_count = self.get_active_validator_indices(epoch).len();
        Ok(spec.committees_per_slot(active_count))
    }

    /// Returns the `index`-th committee of `slot`'s assigned committees, per the swap-or-not
    /// shuffle over that epoch's active validator set.
    pub fn get_beacon_committee(
        &self,
        slot: Slot,
        index: u64,
        spec: &ChainSpec,
    ) -> Result<Vec<usize>, BeaconStateError> {
        let epoch = slot.epoch(spec.slots_per_epoch);
        let committees_per_slot = self.get_committee_count_at_slot(slot, spec)? as u64;
        if index >= committees_per_slot {
            return Err(BeaconStateError::ShardOutOfBounds);
        }

        let active_indices = self.get_active_validator_indices(epoch);
        if active_indices.is_empty() {
            return Err(BeaconStateError::InsufficientValidators);
        }

        let seed = self.get_seed(epoch, spec)?;
        let shuffled = shuffle_list(active_indices.len(), &seed, spec.shuffle_round_count)
            .ok_or(BeaconStateError::InsufficientValidators)?;

        let committee_count = committees_per_slot * spec.slots_per_epoch;
        let slot_offset = (slot.as_u64() % spec.slots_per_epoch) * committees_per_slot;
        let committee_index = slot_offset + index;

        let count = shuffled.len() as u64;
        let start = (count * committee_index / committee_count) as usize;
        let end = (count * (committee_index + 1) / committee_count) as usize;

        Ok(shuffled[start..end]
            .iter()
            .map(|&i| active_indices[i as usize])
            .collect())
    }

    /// The validator index selected to propose at `slot`, via the same shuffle seeded with a
    /// byte derived from `slot` rather than committee index, matching the canonical
    /// `compute_proposer_index` balance-weighted selection.
    pub fn get_beacon_proposer_index(
        &self,
        slot: Slot,
        spec: &ChainSpec,
    ) -> Result<usize, BeaconStateError> {
        let epoch = slot.epoch(spec.slots_per_epoch);
        let active_indices = self.get_active_validator_indices(epoch);
        if active_indices.is_empty() {
            return Err(BeaconStateError::InsufficientValidators);
        }

        let seed = self.get_seed(epoch, spec)?;
        let mut input = seed.to_vec();
        input.extend_from_slice(&slot.as_u64().to_le_bytes());
        let seed_hash = eth2_hashing::hash(&input);

        let mut i = 0u64;
        loop {
            let candidate_index = active_indices[(i % active_indices.len() as u64) as usize];
            let mut hash_input = seed_hash.clone();
            hash_input.extend_from_slice(&(i / 32).to_le_bytes());
            let random_byte = eth2_hashing::hash(&hash_input)[(i % 32) as usize];
            let effective_balance = self.validators[candidate_index].effective_balance;
            if effective_balance.saturating_mul(255)
                >= spec.max_effective_balance.saturating_mul(u64::from(random_byte))
            {
                return Ok(candidate_index);
            }
            i = i.safe_add(1)?;
        }
    }

    pub fn get_total_balance(&self, indices: &[usize], spec: &ChainSpec) -> u64 {
        indices
            .iter()
            .filter_map(|&i| self.validators.get(i))
            .map(|v| v.effective_balance)
            .sum::<u64>()
            .max(spec.effective_balance_increment)
    }

    pub fn get_block_root(&self, epoch: Epoch, spec: &ChainSpec) -> Result<Hash256, BeaconStateError> {
        self.get_block_root_at_slot(epoch.start_slot(spec.slots_per_epoch))
    }

    pub fn get_block_root_at_slot(&self, slot: Slot) -> Result<Hash256, BeaconStateError> {
        let len = self.historical_block_roots.len() as u64;
        if slot >= self.slot || self.slot > slot + len {
            return Err(BeaconStateError::EpochOutOfBounds);
        }
        let index = slot.as_u64() % len;
        Ok(self.historical_block_roots[index as usize])
    }
}
