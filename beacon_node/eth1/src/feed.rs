use crate::errors::Error;
use futures::future::BoxFuture;
use types::Hash256;

/// The consumed side of the ETH1 chain (§1, §6): everything this crate needs from the parent
/// chain, regardless of what sits behind it. [`crate::http_feed::HttpEth1Feed`] is the only
/// implementation, speaking JSON-RPC over HTTP; tests substitute a stub.
pub trait Eth1DepositFeed: Send + Sync {
    fn latest_block_number(&self) -> BoxFuture<'_, Result<u64, Error>>;

    fn block_hash_at_height(&self, height: u64) -> BoxFuture<'_, Result<Option<Hash256>, Error>>;

    /// The block number of `hash` in the ETH1 chain, or `None` if unknown to the follower — used
    /// by the `Eth1Data` tie-break (§4.8, §9).
    fn block_number_of_hash(&self, hash: Hash256) -> BoxFuture<'_, Result<Option<u64>, Error>>;

    /// The unix timestamp of the block at `height`, used to derive `genesis_time` once chain
    /// start fires.
    fn block_timestamp_at_height(&self, height: u64) -> BoxFuture<'_, Result<Option<u64>, Error>>;

    /// Deposit-contract log entries with merkle index `>= from_index`, each paired with its
    /// inclusion block number, in ascending index order.
    fn deposit_logs_since(
        &self,
        from_index: u64,
    ) -> BoxFuture<'_, Result<Vec<(u64, types::Deposit, u64)>, Error>>;
}
