use lazy_static::lazy_static;
use lighthouse_metrics::*;

lazy_static! {
    pub static ref RPC_REQUESTS: Result<IntCounterVec> = try_create_int_counter_vec(
        "rpc_requests_total",
        "Count of validator-RPC calls received, by method",
        &["method"]
    );
    pub static ref RPC_ERRORS: Result<IntCounterVec> = try_create_int_counter_vec(
        "rpc_errors_total",
        "Count of validator-RPC calls that returned a non-OK status, by method",
        &["method"]
    );
}
