use crate::{
    Attestation, AttesterSlashing, Deposit, Eth1Data, Hash256, ProposerSlashing, SignatureBytes,
    Slot, SignedVoluntaryExit,
};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash as DeriveTreeHash;

/// Everything a block carries besides its header fields: the randao reveal, the proposer's eth1
/// vote, and the five operation lists processed in the fixed order C4 requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, DeriveTreeHash)]
pub struct BeaconBlockBody {
    pub randao_reveal: SignatureBytes,
    pub eth1_data: Eth1Data,
    pub proposer_slashings: Vec<ProposerSlashing>,
    pub attester_slashings: Vec<AttesterSlashing>,
    pub attestations: Vec<Attestation>,
    pub deposits: Vec<Deposit>,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

/// An unsigned beacon block. `parent_root` must equal
/// `hash_tree_root(parent_block_header)` unless this is the genesis block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode, DeriveTreeHash)]
pub struct BeaconBlock {
    pub slot: Slot,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBody,
}

impl BeaconBlock {
    pub fn canonical_root(&self) -> Hash256 {
        Hash256::from_slice(&self.tree_hash_root()[..])
    }

    pub fn body_root(&self) -> Hash256 {
        Hash256::from_slice(&self.body.tree_hash_root()[..])
    }

    /// A block signed over its own root, with no body, used only as the genesis placeholder.
    pub fn empty() -> Self {
        BeaconBlock::default()
    }
}

/// The proposer's BLS signature over `BeaconBlock`'s signing root (the root of the block with
/// its own `state_root` left as produced by the state transition, matching `compute_state_root`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, DeriveTreeHash)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: SignatureBytes,
}
