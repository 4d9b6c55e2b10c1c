use crate::errors::Error;
use crate::BeaconChain;
use types::{AttestationData, PublicKeyBytes, Slot};

/// Coarse validator lifecycle, derived from the three epoch fields every `Validator` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorStatus {
    Unknown,
    PendingActivation,
    Active,
    Exited,
    Withdrawable,
}

/// One validator's slot/committee assignment for the epoch `CommitteeAssignment` was asked
/// about, plus whether it also proposes that slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeAssignment {
    pub pubkey: PublicKeyBytes,
    pub validator_index: u64,
    pub slot: Slot,
    pub shard: u64,
    pub committee: Vec<u64>,
    pub is_proposer: bool,
}

/// A validator's balance snapshot at a given slot, the projection `ValidatorPerformance` reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorPerformance {
    pub balance: u64,
    pub effective_balance: u64,
}

impl BeaconChain {
    pub fn validator_index(&self, pubkey: &PublicKeyBytes) -> Result<Option<u64>, Error> {
        let state = self.head_state()?;
        Ok(state
            .validators
            .iter()
            .position(|v| &v.pubkey == pubkey)
            .map(|i| i as u64))
    }

    pub fn validator_status(&self, pubkey: &PublicKeyBytes) -> Result<ValidatorStatus, Error> {
        let state = self.head_state()?;
        let epoch = state.current_epoch(&self.spec);
        let validator = match state.validators.iter().find(|v| &v.pubkey == pubkey) {
            Some(v) => v,
            None => return Ok(ValidatorStatus::Unknown),
        };
        if validator.is_withdrawable_at(epoch) {
            Ok(ValidatorStatus::Withdrawable)
        } else if validator.is_exited_at(epoch) {
            Ok(ValidatorStatus::Exited)
        } else if validator.is_active_at(epoch) {
            Ok(ValidatorStatus::Active)
        } else {
            Ok(ValidatorStatus::PendingActivation)
        }
    }

    /// Every committee slot falling in the epoch starting at `epoch_start`, restricted to the
    /// requested public keys.
    pub fn committee_assignment(
        &self,
        epoch_start: Slot,
        pubkeys: &[PublicKeyBytes],
    ) -> Result<Vec<CommitteeAssignment>, Error> {
        let state = self.head_state()?;
        let epoch = epoch_start.epoch(self.spec.slots_per_epoch);
        let wanted: Vec<(u64, PublicKeyBytes)> = pubkeys
            .iter()
            .filter_map(|pk| {
                state
                    .validators
                    .iter()
                    .position(|v| &v.pubkey == pk)
                    .map(|i| (i as u64, pk.clone()))
            })
            .collect();

        let mut assignments = Vec::new();
        let first_slot = epoch.start_slot(self.spec.slots_per_epoch);
        for slot_offset in 0..self.spec.slots_per_epoch {
            let slot = first_slot + slot_offset;
            let committees_per_slot = state
                .get_committee_count_at_slot(slot, &self.spec)
                .map_err(|_| Error::MissingHead)? as u64;
            let proposer_index = state
                .get_beacon_proposer_index(slot, &self.spec)
                .map_err(|_| Error::MissingHead)? as u64;

            for shard in 0..committees_per_slot {
                let committee = state
                    .get_beacon_committee(slot, shard, &self.spec)
                    .map_err(|_| Error::MissingHead)?;
                let committee_u64: Vec<u64> = committee.iter().map(|&i| i as u64).collect();

                for &(validator_index, ref pubkey) in &wanted {
                    if committee_u64.contains(&validator_index) {
                        assignments.push(CommitteeAssignment {
                            pubkey: pubkey.clone(),
                            validator_index,
                            slot,
                            shard,
                            committee: committee_u64.clone(),
                            is_proposer: validator_index == proposer_index,
                        });
                    }
                }
            }
        }
        Ok(assignments)
    }

    pub fn validator_performance(
        &self,
        slot: Slot,
        pubkey: &PublicKeyBytes,
    ) -> Result<Option<ValidatorPerformance>, Error> {
        let state = self
            .store
            .get_state(slot)?
            .ok_or(Error::MissingHead)?;
        Ok(state
            .validators
            .iter()
            .position(|v| &v.pubkey == pubkey)
            .map(|index| ValidatorPerformance {
                balance: state.balances[index],
                effective_balance: state.validators[index].effective_balance,
            }))
    }

    /// `AttestationDataAtSlot`: the vote a validator assigned to `(slot, shard)` should sign —
    /// the chain head as `beacon_block_root`, and the head state's current justified checkpoint
    /// as `source`. `target` is the checkpoint for the current epoch, rooted at the head state's
    /// own block root since no block has been proposed at the epoch boundary yet when the head
    /// is mid-epoch.
    pub fn attestation_data_at_slot(&self, slot: Slot, shard: u64) -> Result<AttestationData, Error> {
        let head_root = self.store.get_chain_head_root()?.ok_or(Error::MissingHead)?;
        let head_state = self.head_state()?;
        let target_epoch = head_state.current_epoch(&self.spec);

        Ok(AttestationData {
            slot,
            shard,
            beacon_block_root: head_root,
            source: head_state.current_justified_checkpoint,
            target: types::Checkpoint::new(target_epoch, head_root),
        })
    }

    pub fn exited_validators(
        &self,
        pubkeys: &[PublicKeyBytes],
    ) -> Result<Vec<PublicKeyBytes>, Error> {
        let state = self.head_state()?;
        let epoch = state.current_epoch(&self.spec);
        Ok(pubkeys
            .iter()
            .filter(|pk| {
                state
                    .validators
                    .iter()
                    .find(|v| &v.pubkey == *pk)
                    .map(|v| v.is_exited_at(epoch))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
