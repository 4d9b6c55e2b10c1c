//! Consensus data types shared by every other crate in this workspace: SSZ-encodable,
//! tree-hashable structures mirroring the data model, plus `ChainSpec`, the single
//! runtime-configurable source of truth for every tunable constant.

mod attestation;
mod beacon_block;
mod beacon_block_header;
mod beacon_state;
mod chain_spec;
mod checkpoint;
mod bls_bytes;
mod deposit;
mod eth1_data;
mod fork;
mod hash256;
mod slashings;
mod slot_epoch;
mod validator;
mod voluntary_exit;

pub use attestation::{Attestation, AttestationData, IndexedAttestation, PendingAttestation};
pub use beacon_block::{BeaconBlock, BeaconBlockBody, SignedBeaconBlock};
pub use beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader};
pub use beacon_state::{BeaconState, BeaconStateError};
pub use chain_spec::{ChainSpec, Domain};
pub use checkpoint::Checkpoint;
pub use bls_bytes::{PublicKeyBytes, SignatureBytes};
pub use deposit::{Deposit, DepositData};
pub use eth1_data::Eth1Data;
pub use fork::Fork;
pub use hash256::Hash256;
pub use slashings::{AttesterSlashing, ProposerSlashing};
pub use slot_epoch::{Epoch, Slot};
pub use validator::Validator;
pub use voluntary_exit::{SignedVoluntaryExit, VoluntaryExit};
