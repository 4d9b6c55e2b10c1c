use crate::{Hash256, Slot};
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode as SszEncode};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash as SszTreeHash;

/// A header of a `BeaconBlock`: everything needed to reference and sign a block without
/// carrying its full body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, SszEncode, Decode, SszTreeHash)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body_root: Hash256,
}

impl BeaconBlockHeader {
    /// The canonical root used as `parent_root` by any child block.
    pub fn canonical_root(&self) -> Hash256 {
        Hash256::from_slice(&self.tree_hash_root()[..])
    }

    /// `hash_tree_root` of `self` with no signature field to zero (headers are never signed
    /// directly; `SignedBeaconBlockHeader` wraps one).
    pub fn signing_root(&self) -> Hash256 {
        self.canonical_root()
    }
}

/// A `BeaconBlockHeader` together with the proposer's signature over its signing root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SszEncode, Decode, SszTreeHash)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    pub signature: crate::SignatureBytes,
}
