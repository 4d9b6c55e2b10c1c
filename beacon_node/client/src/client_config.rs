use serde_derive::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// The core-relevant slice of node configuration named by §6: a chain-parameter preset, the
/// store's data directory, the RPC bind port, the ETH1 follower endpoint, and the deposit
/// contract address. Everything else a full node needs (networking, slashing protection, REST
/// APIs) is out of scope for this core and lives, if anywhere, in the wiring layer above it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub data_dir: PathBuf,
    pub eth2_config_preset: String,
    pub rpc_address: IpAddr,
    pub rpc_port: u16,
    pub eth1_endpoint: String,
    pub deposit_contract_address: String,
    pub deposit_contract_deploy_block: u64,
    /// A trusted genesis file (§6 "Genesis file") bypasses the ETH1 chain-start latch entirely.
    pub genesis_file: Option<PathBuf>,
    pub eth1_poll_interval_millis: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            data_dir: default_data_dir(),
            eth2_config_preset: "mainnet".to_string(),
            rpc_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            rpc_port: 5051,
            eth1_endpoint: "http://localhost:8545".to_string(),
            deposit_contract_address: String::new(),
            deposit_contract_deploy_block: 0,
            genesis_file: None,
            eth1_poll_interval_millis: 7_000,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lighthouse-core")
}
