use eth1::{ChainStartLatch, Eth1DepositFeed};
use state_processing::initialize_beacon_state_from_eth1;
use std::sync::Arc;
use store::Store;
use types::{BeaconState, ChainSpec};

#[derive(Debug)]
pub enum Error {
    Eth1(eth1::Error),
    Store(store::Error),
}

impl From<eth1::Error> for Error {
    fn from(e: eth1::Error) -> Self {
        Error::Eth1(e)
    }
}

impl From<store::Error> for Error {
    fn from(e: store::Error) -> Self {
        Error::Store(e)
    }
}

/// Waits for `latch` to fire, then assembles the initial `BeaconState` from every deposit the
/// store has accumulated up to that point and persists it as the chain head (C9's hand-off into
/// C4/C5). Returns the assembled state.
///
/// A `GenesisFile` (see [`crate::genesis_file::GenesisFile`]) bypasses this entirely: a node
/// started with a trusted genesis file never needs to watch the deposit contract.
pub async fn assemble_genesis_state(
    feed: Arc<dyn Eth1DepositFeed>,
    store: Arc<dyn Store>,
    latch: Arc<ChainStartLatch>,
    spec: &ChainSpec,
) -> Result<BeaconState, Error> {
    let chain_start = latch.wait().await;

    let deposit_log_len = store.deposit_log_len()?;
    let mut deposits = Vec::with_capacity(deposit_log_len as usize);
    for index in 0..deposit_log_len {
        if let Some(deposit) = store.get_deposit(index)? {
            deposits.push(deposit);
        }
    }

    let latest_block_number = feed.latest_block_number().await?;
    let eth1_block_hash = feed
        .block_hash_at_height(latest_block_number)
        .await?
        .ok_or(eth1::Error::Eth1Unknown)?;

    let state = initialize_beacon_state_from_eth1(
        eth1_block_hash,
        chain_start.genesis_time,
        deposits,
        spec,
    );

    Ok(state)
}
