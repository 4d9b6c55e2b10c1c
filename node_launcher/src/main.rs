use clap::{App, Arg, ArgMatches};
use client::{Client, ClientConfig};
use environment::{Environment, EnvironmentBuilder};
use eth2_config::Eth2Config;
use slog::{crit, info};
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

fn main() {
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    }
}

fn cli() -> App<'static, 'static> {
    App::new("beacon_node_core")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Paul Hauner <paul@paulhauner.com>")
        .about("Eth2 beacon chain core: state transition, fork choice, and the validator-duty RPC.")
        .arg(
            Arg::with_name("datadir")
                .long("datadir")
                .value_name("DIR")
                .help("Data directory for the chain database.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("chain-config")
                .long("chain-config")
                .value_name("PRESET")
                .help("The eth2 chain-parameter preset to launch with.")
                .takes_value(true)
                .possible_values(&["mainnet", "minimal"])
                .default_value("mainnet"),
        )
        .arg(
            Arg::with_name("rpc-address")
                .long("rpc-address")
                .value_name("ADDRESS")
                .help("Listen address for the validator-duty RPC.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("rpc-port")
                .long("rpc-port")
                .value_name("PORT")
                .help("Listen port for the validator-duty RPC.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("eth1-endpoint")
                .long("eth1-endpoint")
                .value_name("HTTP_URL")
                .help("HTTP endpoint of an eth1 node to follow for deposits and chain-start.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("deposit-contract")
                .long("deposit-contract")
                .value_name("ADDRESS")
                .help("Address of the deposit contract on the followed eth1 chain.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("deposit-contract-deploy-block")
                .long("deposit-contract-deploy-block")
                .value_name("BLOCK_NUMBER")
                .help("Block number the deposit contract was deployed at; the eth1 follower does not scan before it.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("genesis-file")
                .long("genesis-file")
                .value_name("FILE")
                .help("A trusted genesis file. Bypasses the eth1 chain-start wait entirely.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("debug-level")
                .long("debug-level")
                .value_name("LEVEL")
                .help("Logging verbosity.")
                .takes_value(true)
                .possible_values(&["info", "debug", "trace", "warn", "error", "crit"])
                .default_value("info"),
        )
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let eth2_config = Eth2Config::from_preset_name(matches.value_of("chain-config").unwrap_or("mainnet"))?;

    let mut environment = EnvironmentBuilder::new()
        .multi_threaded_tokio_runtime()?
        .async_logger(matches.value_of("debug-level").unwrap_or("info"), false, None)?
        .eth2_config(eth2_config)
        .build()?;

    let log = environment.log().clone();
    let client_config = build_client_config(matches, &environment)?;

    let executor = environment.core_executor();
    let eth2_config = environment.eth2_config().clone();
    let inner_log = log.clone();

    let client_result = environment
        .runtime()
        .block_on(async move { Client::new(client_config, eth2_config, executor, inner_log).await });

    let _client = client_result.map_err(|e| format!("{}", e))?;

    info!(log, "Beacon chain core is running");

    let reason = environment
        .block_until_shutdown_requested()
        .map_err(|e| format!("Failed while awaiting shutdown: {}", e))?;
    info!(log, "Shutting down"; "reason" => reason);

    Ok(())
}

fn build_client_config(matches: &ArgMatches, environment: &Environment) -> Result<ClientConfig, String> {
    let mut config = ClientConfig::default();
    config.eth2_config_preset = environment.eth2_config().preset_name.clone();

    if let Some(dir) = matches.value_of("datadir") {
        config.data_dir = PathBuf::from(dir);
    }

    if let Some(address) = matches.value_of("rpc-address") {
        config.rpc_address =
            IpAddr::from_str(address).map_err(|e| format!("Invalid --rpc-address {:?}: {}", address, e))?;
    }

    if let Some(port) = matches.value_of("rpc-port") {
        config.rpc_port = port
            .parse()
            .map_err(|e| format!("Invalid --rpc-port {:?}: {}", port, e))?;
    }

    if let Some(endpoint) = matches.value_of("eth1-endpoint") {
        config.eth1_endpoint = endpoint.to_string();
    }

    if let Some(address) = matches.value_of("deposit-contract") {
        config.deposit_contract_address = address.to_string();
    }

    if let Some(block) = matches.value_of("deposit-contract-deploy-block") {
        config.deposit_contract_deploy_block = block
            .parse()
            .map_err(|e| format!("Invalid --deposit-contract-deploy-block {:?}: {}", block, e))?;
    }

    if let Some(path) = matches.value_of("genesis-file") {
        config.genesis_file = Some(PathBuf::from(path));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_port_flag_overrides_the_default() {
        let matches = cli().get_matches_from(vec!["beacon_node_core", "--rpc-port", "6051"]);
        let environment = EnvironmentBuilder::new()
            .multi_threaded_tokio_runtime()
            .unwrap()
            .async_logger("info", true, None)
            .unwrap()
            .eth2_config(Eth2Config::minimal())
            .build()
            .unwrap();

        let config = build_client_config(&matches, &environment).unwrap();
        assert_eq!(config.rpc_port, 6051);
    }

    #[test]
    fn malformed_rpc_port_is_rejected() {
        let matches = cli().get_matches_from(vec!["beacon_node_core", "--rpc-port", "not-a-port"]);
        let environment = EnvironmentBuilder::new()
            .multi_threaded_tokio_runtime()
            .unwrap()
            .async_logger("info", true, None)
            .unwrap()
            .eth2_config(Eth2Config::minimal())
            .build()
            .unwrap();

        assert!(build_client_config(&matches, &environment).is_err());
    }
}
