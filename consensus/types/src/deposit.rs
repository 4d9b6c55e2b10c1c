use crate::{Hash256, PublicKeyBytes, SignatureBytes};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// The data a prospective validator submits to the deposit contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct DepositData {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub amount: u64,
    pub signature: SignatureBytes,
}

/// A single entry from the deposit-contract Merkle accumulator, with the inclusion proof needed
/// to verify it against `BeaconState::latest_eth1_data.deposit_root` without trusting the
/// follower that reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Deposit {
    pub proof: Vec<Hash256>,
    pub data: DepositData,
}
