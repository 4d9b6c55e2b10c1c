mod client_config;

pub use client_config::ClientConfig;

use beacon_chain::{BeaconChain, ChainConfig};
use eth1::{ChainStartLatch, Eth1DepositFeed, HttpEth1Feed};
use eth2_config::Eth2Config;
use genesis::GenesisFile;
use state_processing::initialize_beacon_state_from_eth1;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use store::{SledStore, Store};
use task_executor::TaskExecutor;

#[derive(Debug)]
pub enum Error {
    Config(String),
    Store(store::Error),
    Eth1(eth1::Error),
    Genesis(genesis::Error),
    Chain(beacon_chain::Error),
    Rpc(tonic::transport::Error),
}

impl From<store::Error> for Error {
    fn from(e: store::Error) -> Self {
        Error::Store(e)
    }
}

impl From<eth1::Error> for Error {
    fn from(e: eth1::Error) -> Self {
        Error::Eth1(e)
    }
}

impl From<genesis::Error> for Error {
    fn from(e: genesis::Error) -> Self {
        Error::Genesis(e)
    }
}

impl From<beacon_chain::Error> for Error {
    fn from(e: beacon_chain::Error) -> Self {
        Error::Chain(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

/// The running node: a `BeaconChain` with its RPC server spawned on `executor`. Dropping this
/// does not stop the server; shutdown happens when `executor`'s root exit signal fires, exactly
/// as every other task in this workspace is stopped.
pub struct Client {
    chain: Arc<BeaconChain>,
}

impl Client {
    pub fn beacon_chain(&self) -> &Arc<BeaconChain> {
        &self.chain
    }

    /// Assembles every long-lived component (store, ETH1 follower or genesis file,
    /// `BeaconChain`, RPC server) and spawns the RPC server on `executor`. Mirrors the order the
    /// teacher's own client boots: store first, then genesis/chain-start, then the chain, then
    /// the RPC surface last since it's the first thing a validator client talks to.
    pub async fn new(
        config: ClientConfig,
        eth2_config: Eth2Config,
        executor: TaskExecutor,
        log: slog::Logger,
    ) -> Result<Self, Error> {
        url::Url::parse(&config.eth1_endpoint)
            .map_err(|e| Error::Config(format!("Invalid --eth1-endpoint {:?}: {}", config.eth1_endpoint, e)))?;

        fs::create_dir_all(&config.data_dir)
            .map_err(|e| Error::Config(format!("Unable to create data dir: {:?}", e)))?;
        let db_path = config.data_dir.join("chain_db");
        let store: Arc<dyn Store> = Arc::new(SledStore::open(&db_path)?);

        let spec = eth2_config.spec.clone();

        let eth1_feed: Arc<dyn Eth1DepositFeed> = Arc::new(HttpEth1Feed::new(
            config.eth1_endpoint.clone(),
            config.deposit_contract_address.clone(),
            config.deposit_contract_deploy_block,
            &spec,
            log.new(slog::o!("service" => "eth1")),
        ));

        let (genesis_state, chain_start) = match &config.genesis_file {
            Some(path) => {
                let state = load_genesis_file(path, &spec)?;
                let latch = Arc::new(ChainStartLatch::new());
                latch.fire(state.genesis_time);
                (state, latch)
            }
            None => {
                let latch = Arc::new(ChainStartLatch::new());
                eth1::spawn_follower(
                    &executor,
                    eth1_feed.clone(),
                    store.clone(),
                    latch.clone(),
                    spec.clone(),
                    Duration::from_millis(config.eth1_poll_interval_millis),
                    log.new(slog::o!("service" => "eth1_follower")),
                );
                let state = genesis::assemble_genesis_state(
                    eth1_feed.clone(),
                    store.clone(),
                    latch.clone(),
                    &spec,
                )
                .await?;
                (state, latch)
            }
        };

        let chain = Arc::new(BeaconChain::from_genesis(
            genesis_state,
            store,
            eth1_feed,
            spec,
            ChainConfig::default(),
            log.new(slog::o!("service" => "beacon_chain")),
        )?);

        let rpc_addr = SocketAddr::new(config.rpc_address, config.rpc_port);
        let rpc_chain = chain.clone();
        let rpc_log = log.new(slog::o!("service" => "rpc"));
        let rpc_exit = executor.exit();
        executor.spawn(
            async move {
                if let Err(e) = rpc::serve(rpc_addr, rpc_chain, chain_start, rpc_log.clone(), rpc_exit).await {
                    slog::crit!(rpc_log, "RPC server exited"; "error" => %e);
                }
            },
            "rpc_server",
        );

        Ok(Client { chain })
    }
}

fn load_genesis_file(path: &Path, spec: &types::ChainSpec) -> Result<types::BeaconState, Error> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Unable to read genesis file: {:?}", e)))?;
    let file = GenesisFile::from_json(&contents)
        .map_err(|e| Error::Config(format!("Unable to parse genesis file: {:?}", e)))?;
    let (genesis_time, eth1_block_hash, deposits) = file.into_deposits();
    Ok(initialize_beacon_state_from_eth1(eth1_block_hash, genesis_time, deposits, spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis::GenesisDepositRecord;
    use std::io::Write;

    /// The returned `Arc<Handle>` must be kept alive by the caller: `TaskExecutor` only holds a
    /// `Weak` reference to it, matching how `environment::Environment` keeps its own handle
    /// alongside the runtime for the process lifetime.
    fn test_executor(exit: exit_future::Exit) -> (TaskExecutor, Arc<tokio::runtime::Handle>) {
        let (signal_tx, _signal_rx) = futures::channel::mpsc::channel(1);
        let handle = Arc::new(tokio::runtime::Handle::current());
        let executor = TaskExecutor::new(Arc::downgrade(&handle), exit, logging::test_logger(), signal_tx);
        (executor, handle)
    }

    #[tokio::test]
    async fn boots_from_a_genesis_file() {
        let data_dir = tempfile::tempdir().unwrap();
        let mut genesis_path = data_dir.path().to_path_buf();
        genesis_path.push("genesis.json");

        let spec = types::ChainSpec::minimal();
        let genesis_file = GenesisFile {
            genesis_time: 1_600_000_000,
            eth1_block_hash: types::Hash256::zero(),
            deposits: vec![GenesisDepositRecord {
                pubkey: types::PublicKeyBytes::zero(),
                withdrawal_credentials: types::Hash256::zero(),
                amount: spec.max_effective_balance,
                signature: types::SignatureBytes::zero(),
                proof: vec![],
            }],
        };
        let mut file = std::fs::File::create(&genesis_path).unwrap();
        file.write_all(serde_json::to_string(&genesis_file).unwrap().as_bytes())
            .unwrap();

        let mut config = ClientConfig::default();
        config.data_dir = data_dir.path().to_path_buf();
        config.genesis_file = Some(genesis_path);
        config.rpc_port = 0;

        let (_signal, exit) = exit_future::signal();
        let (executor, _handle) = test_executor(exit);

        let client = Client::new(config, Eth2Config::minimal(), executor, logging::test_logger())
            .await
            .unwrap();

        let head = client.beacon_chain().canonical_head().unwrap();
        let stored = client.beacon_chain().head_state().unwrap();
        assert_eq!(stored.slot, spec.genesis_slot);
        assert_ne!(head, types::Hash256::zero());
    }

    #[test]
    fn rejects_a_malformed_eth1_endpoint() {
        let mut config = ClientConfig::default();
        config.eth1_endpoint = "not-a-url".to_string();
        assert!(url::Url::parse(&config.eth1_endpoint).is_err());
    }
}
