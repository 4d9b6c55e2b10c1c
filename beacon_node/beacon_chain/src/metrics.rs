use lazy_static::lazy_static;
use lighthouse_metrics::*;

lazy_static! {
    pub static ref BLOCK_PROCESSING_REQUESTS: Result<IntCounter> = try_create_int_counter(
        "beacon_block_processing_requests_total",
        "Count of blocks submitted via ProposeBlock"
    );
    pub static ref BLOCK_PROCESSING_SUCCESSES: Result<IntCounter> = try_create_int_counter(
        "beacon_block_processing_successes_total",
        "Count of blocks that passed state-transition and were stored"
    );
    pub static ref BLOCK_PROCESSING_TIMES: Result<Histogram> = try_create_histogram(
        "beacon_block_processing_seconds",
        "Time taken to run execute() and persist a proposed block"
    );
    pub static ref FORK_CHOICE_HEAD_SLOT: Result<IntGauge> = try_create_int_gauge(
        "beacon_fork_choice_head_slot",
        "Slot of the current fork-choice head"
    );
    pub static ref ATTESTATION_PROCESSING_REQUESTS: Result<IntCounter> = try_create_int_counter(
        "beacon_attestation_processing_requests_total",
        "Count of attestations submitted via AttestHead"
    );
}
