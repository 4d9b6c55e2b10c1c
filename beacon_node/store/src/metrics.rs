use lazy_static::lazy_static;
use lighthouse_metrics::*;

lazy_static! {
    pub static ref STORE_READ_COUNT: Result<IntCounterVec> = try_create_int_counter_vec(
        "store_read_count",
        "Number of reads per store bucket",
        &["bucket"]
    );
    pub static ref STORE_WRITE_COUNT: Result<IntCounterVec> = try_create_int_counter_vec(
        "store_write_count",
        "Number of writes per store bucket",
        &["bucket"]
    );
}
