mod chain_start_latch;
mod deposit_tree;
mod errors;
mod eth1_data_vote;
mod feed;
mod http_feed;
mod metrics;

pub use chain_start_latch::{ChainStart, ChainStartLatch};
pub use errors::Error;
pub use eth1_data_vote::select_eth1_data;
pub use feed::Eth1DepositFeed;
pub use http_feed::HttpEth1Feed;

use std::sync::Arc;
use std::time::Duration;
use types::ChainSpec;

/// Polls `feed` on a fixed interval, advancing the store's deposit log and pending-deposit index
/// and firing `latch` once cumulative deposits cross `spec.deposits_for_chain_start` (C9).
///
/// Runs until `executor`'s exit signal fires.
pub fn spawn_follower(
    executor: &task_executor::TaskExecutor,
    feed: Arc<dyn Eth1DepositFeed>,
    store: Arc<dyn store::Store>,
    latch: Arc<ChainStartLatch>,
    spec: ChainSpec,
    poll_interval: Duration,
    log: slog::Logger,
) {
    let task = async move {
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            interval.tick().await;
            if let Err(e) = poll_once(&*feed, &*store, &latch, &spec).await {
                slog::warn!(log, "eth1 follower poll failed"; "error" => %e);
            }
        }
    };
    executor.spawn(task, "eth1_follower");
}

async fn poll_once(
    feed: &dyn Eth1DepositFeed,
    store: &dyn store::Store,
    latch: &ChainStartLatch,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let next_index = store.deposit_log_len()?;
    let entries = feed.deposit_logs_since(next_index).await?;

    for (_index, deposit, block_number) in entries {
        let assigned_index = store.insert_deposit(&deposit, block_number)?;
        store.insert_pending_deposit(assigned_index, &deposit, block_number)?;
    }

    if !latch.has_fired() {
        let deposit_count = store.deposit_log_len()?;
        if deposit_count >= spec.deposits_for_chain_start {
            let crossing_height = feed.latest_block_number().await?;
            if let Some(genesis_time) = feed.block_timestamp_at_height(crossing_height).await? {
                latch.fire(genesis_time);
            }
        }
    }

    Ok(())
}
