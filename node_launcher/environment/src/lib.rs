use eth2_config::Eth2Config;
use futures::channel::mpsc;
use futures::StreamExt;
use slog::Logger;
use std::path::PathBuf;
use std::sync::Arc;
use task_executor::TaskExecutor;
use tokio::runtime::{Handle, Runtime};

/// Everything a running node needs besides its domain-specific crates: a tokio runtime, the
/// root logger, the resolved `Eth2Config`, and the shutdown wiring every spawned task observes
/// through `TaskExecutor`. One instance is built in `node_launcher::main` and handed down into
/// `beacon_node::client`.
pub struct Environment {
    runtime: Arc<Runtime>,
    /// Kept alive so `executor`'s `Weak<Handle>` stays valid for the environment's lifetime.
    handle: Arc<Handle>,
    executor: TaskExecutor,
    signal: Option<exit_future::Signal>,
    signal_rx: Option<mpsc::Receiver<()>>,
    log: Logger,
    eth2_config: Eth2Config,
}

impl Environment {
    pub fn core_executor(&self) -> TaskExecutor {
        self.executor.clone()
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn eth2_config(&self) -> &Eth2Config {
        &self.eth2_config
    }

    /// Blocks the calling thread until either ctrl-c is pressed or some spawned task asks for
    /// shutdown via `TaskExecutor::shutdown_sender`, then fires the root `exit_future::Signal` so
    /// every task blocked on `TaskExecutor::exit()` unblocks. Returns the reason as a string for
    /// the caller to log before exiting.
    pub fn block_until_shutdown_requested(&mut self) -> Result<String, String> {
        let (ctrlc_tx, mut ctrlc_rx) = mpsc::channel(1);
        ctrlc::set_handler(move || {
            let mut tx = ctrlc_tx.clone();
            let _ = tx.try_send(());
        })
        .map_err(|e| format!("Failed to set ctrl-c handler: {:?}", e))?;

        let mut signal_rx = self
            .signal_rx
            .take()
            .ok_or_else(|| "Environment has already been shut down".to_string())?;

        let reason = self.runtime.block_on(async move {
            tokio::select! {
                _ = ctrlc_rx.next() => "Ctrl-C received".to_string(),
                _ = signal_rx.next() => "Shutdown requested by an internal task".to_string(),
            }
        });

        if let Some(signal) = self.signal.take() {
            let _ = signal.fire();
        }

        Ok(reason)
    }
}

#[derive(Default)]
pub struct EnvironmentBuilder {
    runtime: Option<Runtime>,
    log: Option<Logger>,
    eth2_config: Option<Eth2Config>,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multi_threaded_tokio_runtime(mut self) -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|e| format!("Failed to start tokio runtime: {:?}", e))?;
        self.runtime = Some(runtime);
        Ok(self)
    }

    pub fn async_logger(
        mut self,
        debug_level: &str,
        disable_colour: bool,
        log_file: Option<PathBuf>,
    ) -> Result<Self, String> {
        self.log = Some(logging::build_root_logger(
            debug_level,
            disable_colour,
            log_file.as_deref(),
        ));
        Ok(self)
    }

    pub fn eth2_config(mut self, eth2_config: Eth2Config) -> Self {
        self.eth2_config = Some(eth2_config);
        self
    }

    pub fn build(self) -> Result<Environment, String> {
        let runtime = Arc::new(
            self.runtime
                .ok_or_else(|| "No tokio runtime configured; call multi_threaded_tokio_runtime() first".to_string())?,
        );
        let log = self
            .log
            .ok_or_else(|| "No logger configured; call async_logger() first".to_string())?;
        let eth2_config = self.eth2_config.unwrap_or_default();

        let (signal, exit) = exit_future::signal();
        let (signal_tx, signal_rx) = mpsc::channel(1);
        let handle = Arc::new(runtime.handle().clone());
        let executor = TaskExecutor::new(Arc::downgrade(&handle), exit, log.clone(), signal_tx);

        Ok(Environment {
            runtime,
            handle,
            executor,
            signal: Some(signal),
            signal_rx: Some(signal_rx),
            log,
            eth2_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_a_runtime() {
        let err = EnvironmentBuilder::new()
            .async_logger("info", true, None)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.contains("tokio runtime"));
    }

    #[test]
    fn build_requires_a_logger() {
        let err = EnvironmentBuilder::new()
            .multi_threaded_tokio_runtime()
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.contains("logger"));
    }

    #[test]
    fn a_task_can_request_shutdown() {
        let mut env = EnvironmentBuilder::new()
            .multi_threaded_tokio_runtime()
            .unwrap()
            .async_logger("info", true, None)
            .unwrap()
            .eth2_config(Eth2Config::minimal())
            .build()
            .unwrap();

        let executor = env.core_executor();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            let mut tx = executor.shutdown_sender();
            let _ = tx.try_send(());
        });

        let reason = env.block_until_shutdown_requested().unwrap();
        assert_eq!(reason, "Shutdown requested by an internal task");
    }
}
