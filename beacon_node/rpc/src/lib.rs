mod error;
mod metrics;
mod service;

pub mod pb {
    tonic::include_proto!("validator");
}

pub use service::ValidatorServer;

use pb::validator_service_server::ValidatorServiceServer;
use std::net::SocketAddr;
use std::sync::Arc;

/// Binds `ValidatorServer` and serves it until `exit` resolves, mirroring how every other
/// long-running task in this workspace is wired through `task_executor`'s shutdown signal rather
/// than a bespoke cancellation primitive.
pub async fn serve(
    addr: SocketAddr,
    chain: Arc<beacon_chain::BeaconChain>,
    chain_start: Arc<eth1::ChainStartLatch>,
    log: slog::Logger,
    exit: exit_future::Exit,
) -> Result<(), tonic::transport::Error> {
    let server = ValidatorServer::new(chain, chain_start, log.clone());
    slog::info!(log, "RPC listening"; "address" => %addr);

    tonic::transport::Server::builder()
        .add_service(ValidatorServiceServer::new(server))
        .serve_with_shutdown(addr, async move {
            exit.await;
        })
        .await
}
