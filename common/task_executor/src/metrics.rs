use lazy_static::lazy_static;
use lighthouse_metrics::*;

lazy_static! {
    pub static ref ASYNC_TASKS_COUNT: Result<IntGaugeVec> = try_create_int_gauge_vec(
        "async_tasks_count",
        "Count of active tasks spawned on the tokio async executor, per task name",
        &["task"]
    );
    pub static ref BLOCKING_TASKS_COUNT: Result<IntGauge> = try_create_int_gauge(
        "blocking_tasks_count",
        "Count of active tasks spawned on the blocking thread pool"
    );
    pub static ref BLOCKING_TASKS_HISTOGRAM: Result<Histogram> = try_create_histogram(
        "blocking_tasks_histogram",
        "Time taken by blocking tasks"
    );
}
