use crate::Epoch;
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// Describes the fork a state belongs to. `previous_version`/`current_version` are mixed into
/// every signature domain so that messages cannot be replayed across forks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Fork {
    pub previous_version: [u8; 4],
    pub current_version: [u8; 4],
    pub epoch: Epoch,
}

impl Fork {
    pub fn genesis(epoch: Epoch) -> Self {
        Fork {
            previous_version: [0; 4],
            current_version: [0; 4],
            epoch,
        }
    }

    /// Returns the fork version active at `epoch`.
    pub fn version_for_epoch(&self, epoch: Epoch) -> [u8; 4] {
        if epoch < self.epoch {
            self.previous_version
        } else {
            self.current_version
        }
    }
}
