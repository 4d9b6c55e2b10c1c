mod genesis_file;
mod service;

pub use genesis_file::{GenesisDepositRecord, GenesisFile};
pub use service::{assemble_genesis_state, Error};
