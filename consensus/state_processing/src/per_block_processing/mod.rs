mod attestations;
mod attester_slashings;
mod block_header;
pub(crate) mod deposits;
mod eth1_data;
mod exits;
mod proposer_slashings;
mod randao;

pub use attestations::process_attestations;
pub use attester_slashings::process_attester_slashings;
pub use block_header::process_block_header;
pub use deposits::process_deposits;
pub use eth1_data::process_eth1_data;
pub use exits::process_voluntary_exits;
pub use proposer_slashings::process_proposer_slashings;
pub use randao::process_randao;

use crate::errors::BlockProcessingError;
use types::{BeaconBlock, BeaconState, ChainSpec};

/// Governs whether `process_block` re-verifies signatures already checked by an earlier pass
/// (e.g. the gossip validator). `VerifyIndividual` checks every signature; `BlockVerified` skips
/// them, trusting the caller's prior verification — used when replaying a block already known
/// to have passed full validation once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSignatureStrategy {
    VerifyIndividual,
    BlockVerified,
}

/// Applies `block`'s header, randao, eth1 vote, and the five operation kinds to `state`, in the
/// fixed order §4.4 specifies.
pub fn process_block(
    state: &mut BeaconState,
    block: &BeaconBlock,
    strategy: BlockSignatureStrategy,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    process_block_header(state, block, spec)?;

    if strategy == BlockSignatureStrategy::VerifyIndividual {
        process_randao(state, block, spec)?;
    }

    process_eth1_data(state, block, spec);

    let body = &block.body;
    process_proposer_slashings(state, &body.proposer_slashings, spec)?;
    process_attester_slashings(state, &body.attester_slashings, spec)?;
    process_attestations(state, &body.attestations, spec)?;
    process_deposits(state, &body.deposits, spec)?;
    process_voluntary_exits(state, &body.voluntary_exits, spec)?;

    Ok(())
}
