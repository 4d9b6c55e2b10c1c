use crate::{Epoch, Fork, Hash256, Slot};
use serde_derive::{Deserialize, Serialize};

/// Each of the BLS signature domains used to separate signed message kinds from one another.
pub enum Domain {
    BeaconProposer,
    Randao,
    Attestation,
    Deposit,
    VoluntaryExit,
}

/// Holds every tunable constant named in C1. Instances are produced by
/// [`ChainSpec::mainnet`] or [`ChainSpec::minimal`]; tests may substitute an arbitrary value
/// via [`crate::chain_spec::ChainSpec`]'s `Default`-free construction. There is deliberately no
/// `set_*` API: callers replace the whole struct, never mutate a field in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    /*
     * Misc
     */
    pub slots_per_epoch: u64,
    pub target_committee_size: usize,
    pub shard_count: u64,
    pub shuffle_round_count: u8,
    pub min_per_epoch_churn_limit: u64,
    pub churn_limit_quotient: u64,

    /*
     * Gwei values
     */
    pub max_deposit_amount: u64,
    pub max_effective_balance: u64,
    pub ejection_balance: u64,
    pub effective_balance_increment: u64,

    /*
     * Initial values
     */
    pub genesis_slot: Slot,
    pub far_future_epoch: Epoch,
    pub zero_hash: Hash256,
    pub bls_withdrawal_prefix_byte: u8,

    /*
     * Time parameters
     */
    pub slot_duration_seconds: u64,
    pub min_attestation_inclusion_delay: u64,
    pub activation_exit_delay: u64,
    pub slots_per_historical_root: usize,
    pub epochs_per_eth1_voting_period: u64,
    pub min_validator_withdrawability_delay: Epoch,
    pub min_epochs_to_inactivity_penalty: u64,

    /*
     * Reward and penalty quotients
     */
    pub base_reward_quotient: u64,
    pub whistleblower_reward_quotient: u64,
    pub proposer_reward_quotient: u64,
    pub inactivity_penalty_quotient: u64,
    pub min_slashing_penalty_quotient: u64,

    /*
     * Max operations per block
     */
    pub max_proposer_slashings: usize,
    pub max_attester_slashings: usize,
    pub max_attestations: usize,
    pub max_deposits: usize,
    pub max_voluntary_exits: usize,

    /*
     * Deposit contract / eth1 follower
     */
    pub deposit_contract_tree_depth: usize,
    pub eth1_follow_distance: u64,
    pub deposits_for_chain_start: u64,

    /*
     * Signature domains (mixed with the fork version by `get_domain`)
     */
    domain_beacon_proposer: u32,
    domain_randao: u32,
    domain_attestation: u32,
    domain_deposit: u32,
    domain_voluntary_exit: u32,
}

impl ChainSpec {
    /// Mixes a message-kind domain with the fork version active at `epoch`, per C2.
    pub fn get_domain(&self, epoch: Epoch, domain: Domain, fork: &Fork) -> [u8; 8] {
        let domain_constant = match domain {
            Domain::BeaconProposer => self.domain_beacon_proposer,
            Domain::Randao => self.domain_randao,
            Domain::Attestation => self.domain_attestation,
            Domain::Deposit => self.domain_deposit,
            Domain::VoluntaryExit => self.domain_voluntary_exit,
        };

        let fork_version = fork.version_for_epoch(epoch);

        let mut out = [0u8; 8];
        out[0..4].copy_from_slice(&fork_version);
        out[4..8].copy_from_slice(&domain_constant.to_le_bytes());
        out
    }

    /// Number of committees formed at any slot, derived from the active validator count.
    pub fn committees_per_slot(&self, active_validator_count: usize) -> usize {
        let committees_per_epoch = std::cmp::max(
            1,
            std::cmp::min(
                self.shard_count as usize / self.slots_per_epoch as usize,
                active_validator_count / self.slots_per_epoch as usize / self.target_committee_size,
            ),
        );
        std::cmp::max(1, committees_per_epoch)
    }

    pub fn mainnet() -> Self {
        Self {
            slots_per_epoch: 32,
            target_committee_size: 128,
            shard_count: 64,
            shuffle_round_count: 90,
            min_per_epoch_churn_limit: 4,
            churn_limit_quotient: 65_536,

            max_deposit_amount: 32_000_000_000,
            max_effective_balance: 32_000_000_000,
            ejection_balance: 16_000_000_000,
            effective_balance_increment: 1_000_000_000,

            genesis_slot: Slot::new(0),
            far_future_epoch: Epoch::new(u64::max_value()),
            zero_hash: Hash256::zero(),
            bls_withdrawal_prefix_byte: 0,

            slot_duration_seconds: 12,
            min_attestation_inclusion_delay: 1,
            activation_exit_delay: 4,
            slots_per_historical_root: 8_192,
            epochs_per_eth1_voting_period: 64,
            min_validator_withdrawability_delay: Epoch::new(256),
            min_epochs_to_inactivity_penalty: 4,

            base_reward_quotient: 32,
            whistleblower_reward_quotient: 512,
            proposer_reward_quotient: 8,
            inactivity_penalty_quotient: 33_554_432,
            min_slashing_penalty_quotient: 128,

            max_proposer_slashings: 16,
            max_attester_slashings: 2,
            max_attestations: 128,
            max_deposits: 16,
            max_voluntary_exits: 16,

            deposit_contract_tree_depth: 32,
            eth1_follow_distance: 2_048,
            deposits_for_chain_start: 16_384,

            domain_beacon_proposer: 0,
            domain_randao: 1,
            domain_attestation: 2,
            domain_deposit: 3,
            domain_voluntary_exit: 4,
        }
    }

    /// A small-validator-set preset used by tests, matching C1's override mechanism.
    pub fn minimal() -> Self {
        Self {
            slots_per_epoch: 8,
            target_committee_size: 4,
            shard_count: 8,
            shuffle_round_count: 10,
            min_per_epoch_churn_limit: 2,
            slots_per_historical_root: 64,
            epochs_per_eth1_voting_period: 4,
            eth1_follow_distance: 16,
            deposits_for_chain_start: 64,
            ..ChainSpec::mainnet()
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_constructs() {
        let _ = ChainSpec::mainnet();
    }

    #[test]
    fn domains_are_disjoint() {
        let spec = ChainSpec::mainnet();
        let fork = Fork::genesis(Epoch::new(0));
        let epoch = Epoch::new(0);
        let domains = [
            spec.get_domain(epoch, Domain::BeaconProposer, &fork),
            spec.get_domain(epoch, Domain::Randao, &fork),
            spec.get_domain(epoch, Domain::Attestation, &fork),
            spec.get_domain(epoch, Domain::Deposit, &fork),
            spec.get_domain(epoch, Domain::VoluntaryExit, &fork),
        ];
        for i in 0..domains.len() {
            for j in (i + 1)..domains.len() {
                assert_ne!(domains[i], domains[j]);
            }
        }
    }
}
