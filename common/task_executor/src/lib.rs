mod metrics;

use futures::channel::mpsc;
use futures::future::{self, Either};
use futures::Future;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;

/// A wrapper around a `tokio` executor that ties every spawned task to the node's shutdown
/// signal, so a `ctrl-c` (or any other exit trigger) stops new work and lets in-flight work
/// observe cancellation rather than leaving detached tasks running past shutdown.
#[derive(Clone)]
pub struct TaskExecutor {
    handle: Weak<Handle>,
    exit: exit_future::Exit,
    signal_tx: mpsc::Sender<()>,
    log: slog::Logger,
}

impl TaskExecutor {
    pub fn new(
        handle: Weak<Handle>,
        exit: exit_future::Exit,
        log: slog::Logger,
        signal_tx: mpsc::Sender<()>,
    ) -> Self {
        TaskExecutor {
            handle,
            exit,
            signal_tx,
            log,
        }
    }

    pub fn clone_with_name(&self, service_name: String) -> Self {
        TaskExecutor {
            handle: self.handle.clone(),
            exit: self.exit.clone(),
            signal_tx: self.signal_tx.clone(),
            log: self.log.new(slog::o!("service" => service_name)),
        }
    }

    /// Spawns a future that runs until completion or until the shutdown signal fires,
    /// whichever comes first. The task is not awaited and its result is discarded; use
    /// `spawn_handle` when the caller needs the output.
    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static, name: &'static str) {
        if let Some(handle) = self.handle() {
            metrics::inc_gauge_vec(&metrics::ASYNC_TASKS_COUNT, &[name]);
            let log = self.log.clone();
            let exit = self.exit.clone();
            handle.spawn(async move {
                match future::select(Box::pin(task), exit).await {
                    Either::Left(_) => {}
                    Either::Right(_) => {
                        slog::debug!(log, "Task shutdown early"; "task" => name);
                    }
                }
                metrics::dec_gauge_vec(&metrics::ASYNC_TASKS_COUNT, &[name]);
            });
        } else {
            slog::debug!(self.log, "Ignoring task spawn from a shutdown executor"; "task" => name);
        }
    }

    /// Spawns a future, returning a `JoinHandle` that resolves once the task finishes or the
    /// shutdown signal fires, whichever is first — `None` in the latter case.
    pub fn spawn_handle<R: Send + 'static>(
        &self,
        task: impl Future<Output = R> + Send + 'static,
        name: &'static str,
    ) -> Option<tokio::task::JoinHandle<Option<R>>> {
        let handle = self.handle()?;
        metrics::inc_gauge_vec(&metrics::ASYNC_TASKS_COUNT, &[name]);
        let log = self.log.clone();
        let exit = self.exit.clone();
        Some(handle.spawn(async move {
            let result = match future::select(Box::pin(task), exit).await {
                Either::Left((result, _)) => Some(result),
                Either::Right(_) => {
                    slog::debug!(log, "Task shutdown early"; "task" => name);
                    None
                }
            };
            metrics::dec_gauge_vec(&metrics::ASYNC_TASKS_COUNT, &[name]);
            result
        }))
    }

    /// Runs `task` on the blocking thread pool, exempting it from the async scheduler so that
    /// CPU-bound work (signature batches, SSZ hashing) never starves the reactor.
    pub fn spawn_blocking<F>(&self, task: F, name: &'static str)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(handle) = self.handle() {
            metrics::inc_gauge(&metrics::BLOCKING_TASKS_COUNT);
            let timer = metrics::start_timer(&metrics::BLOCKING_TASKS_HISTOGRAM);
            let log = self.log.clone();
            handle.spawn_blocking(move || {
                task();
                drop(timer);
                metrics::dec_gauge(&metrics::BLOCKING_TASKS_COUNT);
                slog::trace!(log, "Blocking task complete"; "task" => name);
            });
        } else {
            slog::debug!(self.log, "Ignoring task spawn from a shutdown executor"; "task" => name);
        }
    }

    pub fn handle(&self) -> Option<Arc<Handle>> {
        self.handle.upgrade()
    }

    pub fn exit(&self) -> exit_future::Exit {
        self.exit.clone()
    }

    pub fn log(&self) -> &slog::Logger {
        &self.log
    }

    pub fn shutdown_sender(&self) -> mpsc::Sender<()> {
        self.signal_tx.clone()
    }
}
