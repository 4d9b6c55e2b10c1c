use lazy_static::lazy_static;
use lighthouse_metrics::*;

lazy_static! {
    pub static ref ETH1_LATEST_BLOCK_NUMBER: Result<IntGauge> = try_create_int_gauge(
        "eth1_latest_block_number",
        "The highest ETH1 block number observed by the follower"
    );
    pub static ref ETH1_DEPOSITS_CACHED: Result<IntGauge> = try_create_int_gauge(
        "eth1_deposits_cached",
        "Number of deposit-contract log entries known to the accumulator"
    );
    pub static ref ETH1_RPC_REQUESTS: Result<IntCounterVec> = try_create_int_counter_vec(
        "eth1_rpc_requests_total",
        "Count of JSON-RPC calls made to the ETH1 endpoint, by method",
        &["method"]
    );
    pub static ref ETH1_RPC_ERRORS: Result<IntCounterVec> = try_create_int_counter_vec(
        "eth1_rpc_errors_total",
        "Count of failed JSON-RPC calls to the ETH1 endpoint, by method",
        &["method"]
    );
}
