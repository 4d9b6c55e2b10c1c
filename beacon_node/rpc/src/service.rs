use crate::error::{chain_error_to_status, decode_error_to_status};
use crate::metrics;
use crate::pb;
use beacon_chain::{BeaconChain, ValidatorStatus};
use eth1::ChainStartLatch;
use futures::StreamExt;
use ssz::{Decode, Encode};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use types::{Attestation, PublicKeyBytes, SignedBeaconBlock, Slot};

type BoxStream<T> = Pin<Box<dyn futures::Stream<Item = Result<T, Status>> + Send + 'static>>;

fn observe<T>(method: &'static str, result: Result<T, Status>) -> Result<T, Status> {
    lighthouse_metrics::inc_counter_vec(&metrics::RPC_REQUESTS, &[method]);
    if result.is_err() {
        lighthouse_metrics::inc_counter_vec(&metrics::RPC_ERRORS, &[method]);
    }
    result
}

fn pubkey_from_bytes(bytes: &[u8]) -> Result<PublicKeyBytes, Status> {
    PublicKeyBytes::from_slice(bytes)
        .map_err(|_| Status::invalid_argument("malformed public key"))
}

pub struct ValidatorServer {
    chain: Arc<BeaconChain>,
    chain_start: Arc<ChainStartLatch>,
    log: slog::Logger,
}

impl ValidatorServer {
    pub fn new(chain: Arc<BeaconChain>, chain_start: Arc<ChainStartLatch>, log: slog::Logger) -> Self {
        ValidatorServer { chain, chain_start, log }
    }
}

fn is_active_or_later(status: ValidatorStatus) -> bool {
    matches!(
        status,
        ValidatorStatus::Active | ValidatorStatus::Exited | ValidatorStatus::Withdrawable
    )
}

#[tonic::async_trait]
impl pb::validator_service_server::ValidatorService for ValidatorServer {
    type WaitForChainStartStream = BoxStream<pb::ChainStartEvent>;
    type LatestAttestationStream = BoxStream<pb::SszBytes>;
    type WaitForActivationStream = BoxStream<pb::ActivationEvent>;

    async fn wait_for_chain_start(
        &self,
        _request: Request<pb::Empty>,
    ) -> Result<Response<Self::WaitForChainStartStream>, Status> {
        let latch = self.chain_start.clone();
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        tokio::spawn(async move {
            let start = latch.wait().await;
            let _ = tx
                .send(Ok(pb::ChainStartEvent { started: true, genesis_time: start.genesis_time }))
                .await;
        });
        let stream: Self::WaitForChainStartStream = Box::pin(ReceiverStream::new(rx));
        observe("WaitForChainStart", Ok(Response::new(stream)))
    }

    async fn canonical_head(
        &self,
        _request: Request<pb::Empty>,
    ) -> Result<Response<pb::Hash256Msg>, Status> {
        let root = observe("CanonicalHead", self.chain.canonical_head().map_err(chain_error_to_status))?;
        Ok(Response::new(pb::Hash256Msg { root: root.as_bytes().to_vec() }))
    }

    async fn latest_attestation(
        &self,
        _request: Request<pb::Empty>,
    ) -> Result<Response<Self::LatestAttestationStream>, Status> {
        let receiver = self
            .chain
            .chain_events()
            .take_attestation_receiver()
            .ok_or_else(|| Status::failed_precondition("LatestAttestation already has a subscriber"))?;

        let stream = ReceiverStream::new(receiver).map(|attestation| {
            Ok(pb::SszBytes { ssz: attestation.as_ssz_bytes() })
        });
        let boxed: Self::LatestAttestationStream = Box::pin(stream);
        observe("LatestAttestation", Ok(Response::new(boxed)))
    }

    async fn pending_deposits(
        &self,
        _request: Request<pb::Empty>,
    ) -> Result<Response<pb::SszList>, Status> {
        let deposits = observe(
            "PendingDeposits",
            self.chain.pending_deposits().await.map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::SszList {
            items: deposits.iter().map(|d| d.as_ssz_bytes()).collect(),
        }))
    }

    async fn eth1_data(
        &self,
        _request: Request<pb::Empty>,
    ) -> Result<Response<pb::SszBytes>, Status> {
        let data = observe(
            "Eth1Data",
            self.chain.eth1_data().await.map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::SszBytes { ssz: data.as_ssz_bytes() }))
    }

    async fn fork_data(
        &self,
        _request: Request<pb::Empty>,
    ) -> Result<Response<pb::SszBytes>, Status> {
        let state = observe("ForkData", self.chain.head_state().map_err(chain_error_to_status))?;
        Ok(Response::new(pb::SszBytes { ssz: state.fork.as_ssz_bytes() }))
    }

    async fn block_tree(
        &self,
        _request: Request<pb::Empty>,
    ) -> Result<Response<pb::BlockTreeResponse>, Status> {
        let nodes = observe("BlockTree", self.chain.block_tree().map_err(chain_error_to_status))?;
        Ok(Response::new(block_tree_response(nodes)))
    }

    async fn block_tree_by_slots(
        &self,
        request: Request<pb::SlotRange>,
    ) -> Result<Response<pb::BlockTreeResponse>, Status> {
        let range = request.into_inner();
        let nodes = observe(
            "BlockTreeBySlots",
            self.chain
                .block_tree_by_slots(Slot::new(range.from), Slot::new(range.to))
                .map_err(chain_error_to_status),
        )?;
        Ok(Response::new(block_tree_response(nodes)))
    }

    async fn attest_head(
        &self,
        request: Request<pb::SszBytes>,
    ) -> Result<Response<pb::Hash256Msg>, Status> {
        let bytes = request.into_inner().ssz;
        let attestation = Attestation::from_ssz_bytes(&bytes)
            .map_err(|e| decode_error_to_status("Attestation", e))?;
        let root = observe(
            "AttestHead",
            self.chain.process_attestation(attestation).await.map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::Hash256Msg { root: root.as_bytes().to_vec() }))
    }

    async fn attestation_data_at_slot(
        &self,
        request: Request<pb::ShardSlot>,
    ) -> Result<Response<pb::SszBytes>, Status> {
        let req = request.into_inner();
        let data = observe(
            "AttestationDataAtSlot",
            self.chain
                .attestation_data_at_slot(Slot::new(req.slot), req.shard)
                .map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::SszBytes { ssz: data.as_ssz_bytes() }))
    }

    async fn propose_block(
        &self,
        request: Request<pb::SszBytes>,
    ) -> Result<Response<pb::Hash256Msg>, Status> {
        let bytes = request.into_inner().ssz;
        let signed_block = SignedBeaconBlock::from_ssz_bytes(&bytes)
            .map_err(|e| decode_error_to_status("SignedBeaconBlock", e))?;
        let root = observe(
            "ProposeBlock",
            self.chain.process_block(signed_block).map_err(chain_error_to_status),
        )?;
        slog::debug!(self.log, "block proposed via RPC"; "root" => ?root);
        Ok(Response::new(pb::Hash256Msg { root: root.as_bytes().to_vec() }))
    }

    async fn compute_state_root(
        &self,
        request: Request<pb::SszBytes>,
    ) -> Result<Response<pb::Hash256Msg>, Status> {
        let bytes = request.into_inner().ssz;
        let block = types::BeaconBlock::from_ssz_bytes(&bytes)
            .map_err(|e| decode_error_to_status("BeaconBlock", e))?;
        let root = observe(
            "ComputeStateRoot",
            self.chain.compute_state_root(&block).map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::Hash256Msg { root: root.as_bytes().to_vec() }))
    }

    async fn proposer_index(
        &self,
        request: Request<pb::SlotMsg>,
    ) -> Result<Response<pb::ValidatorIndexMsg>, Status> {
        let slot = Slot::new(request.into_inner().slot);
        let index = observe(
            "ProposerIndex",
            self.chain.proposer_index(slot).map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::ValidatorIndexMsg { index }))
    }

    async fn validator_index(
        &self,
        request: Request<pb::PubkeyMsg>,
    ) -> Result<Response<pb::ValidatorIndexResponse>, Status> {
        let pubkey = pubkey_from_bytes(&request.into_inner().pubkey)?;
        let index = observe(
            "ValidatorIndex",
            self.chain.validator_index(&pubkey).map_err(chain_error_to_status),
        )?;
        Ok(Response::new(match index {
            Some(index) => pb::ValidatorIndexResponse { found: true, index },
            None => pb::ValidatorIndexResponse { found: false, index: 0 },
        }))
    }

    async fn validator_status(
        &self,
        request: Request<pb::PubkeyMsg>,
    ) -> Result<Response<pb::ValidatorStatusMsg>, Status> {
        let pubkey = pubkey_from_bytes(&request.into_inner().pubkey)?;
        let status = observe(
            "ValidatorStatus",
            self.chain.validator_status(&pubkey).map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::ValidatorStatusMsg { status: status_code(status) as i32 }))
    }

    async fn committee_assignment(
        &self,
        request: Request<pb::CommitteeAssignmentRequest>,
    ) -> Result<Response<pb::CommitteeAssignmentResponse>, Status> {
        let req = request.into_inner();
        let pubkeys = req
            .pubkeys
            .iter()
            .map(|bytes| pubkey_from_bytes(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let assignments = observe(
            "CommitteeAssignment",
            self.chain
                .committee_assignment(Slot::new(req.epoch_start_slot), &pubkeys)
                .map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::CommitteeAssignmentResponse {
            assignments: assignments
                .into_iter()
                .map(|a| pb::CommitteeAssignmentMsg {
                    pubkey: a.pubkey.as_bytes().to_vec(),
                    validator_index: a.validator_index,
                    slot: a.slot.as_u64(),
                    shard: a.shard,
                    committee: a.committee,
                    is_proposer: a.is_proposer,
                })
                .collect(),
        }))
    }

    async fn validator_performance(
        &self,
        request: Request<pb::ValidatorPerformanceRequest>,
    ) -> Result<Response<pb::ValidatorPerformanceResponse>, Status> {
        let req = request.into_inner();
        let pubkey = pubkey_from_bytes(&req.pubkey)?;
        let performance = observe(
            "ValidatorPerformance",
            self.chain
                .validator_performance(Slot::new(req.slot), &pubkey)
                .map_err(chain_error_to_status),
        )?;
        Ok(Response::new(match performance {
            Some(p) => pb::ValidatorPerformanceResponse {
                found: true,
                balance: p.balance,
                effective_balance: p.effective_balance,
            },
            None => pb::ValidatorPerformanceResponse { found: false, balance: 0, effective_balance: 0 },
        }))
    }

    async fn wait_for_activation(
        &self,
        request: Request<pb::PubkeysMsg>,
    ) -> Result<Response<Self::WaitForActivationStream>, Status> {
        let pubkeys = request
            .into_inner()
            .pubkeys
            .iter()
            .map(|bytes| pubkey_from_bytes(bytes))
            .collect::<Result<Vec<_>, _>>()?;

        let chain = self.chain.clone();
        let (tx, rx) = tokio::sync::mpsc::channel(pubkeys.len().max(1));
        tokio::spawn(async move {
            let mut head_rx = chain.chain_events().subscribe_head();
            let mut pending = pubkeys;
            loop {
                let mut still_pending = Vec::with_capacity(pending.len());
                for pubkey in pending {
                    match chain.validator_status(&pubkey) {
                        Ok(status) if is_active_or_later(status) => {
                            let event = pb::ActivationEvent {
                                pubkey: pubkey.as_bytes().to_vec(),
                                status: status_code(status) as i32,
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                return;
                            }
                        }
                        Ok(_) => still_pending.push(pubkey),
                        Err(e) => {
                            let _ = tx.send(Err(chain_error_to_status(e))).await;
                            return;
                        }
                    }
                }
                pending = still_pending;
                if pending.is_empty() || head_rx.changed().await.is_err() {
                    return;
                }
            }
        });

        let stream: Self::WaitForActivationStream = Box::pin(ReceiverStream::new(rx));
        observe("WaitForActivation", Ok(Response::new(stream)))
    }

    async fn exited_validators(
        &self,
        request: Request<pb::PubkeysMsg>,
    ) -> Result<Response<pb::PubkeysMsg>, Status> {
        let pubkeys = request
            .into_inner()
            .pubkeys
            .iter()
            .map(|bytes| pubkey_from_bytes(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let exited = observe(
            "ExitedValidators",
            self.chain.exited_validators(&pubkeys).map_err(chain_error_to_status),
        )?;
        Ok(Response::new(pb::PubkeysMsg {
            pubkeys: exited.into_iter().map(|pk| pk.as_bytes().to_vec()).collect(),
        }))
    }
}

fn block_tree_response(nodes: Vec<beacon_chain::BlockTreeNode>) -> pb::BlockTreeResponse {
    pb::BlockTreeResponse {
        nodes: nodes
            .into_iter()
            .map(|n| pb::BlockTreeNodeMsg {
                block_root: n.block_root.as_bytes().to_vec(),
                has_parent: n.parent_root.is_some(),
                parent_root: n.parent_root.map(|r| r.as_bytes().to_vec()).unwrap_or_default(),
                slot: n.slot.as_u64(),
                participated_votes: n.participated_votes,
                total_votes: n.total_votes,
            })
            .collect(),
    }
}

fn status_code(status: ValidatorStatus) -> pb::ValidatorStatusCode {
    match status {
        ValidatorStatus::Unknown => pb::ValidatorStatusCode::Unknown,
        ValidatorStatus::PendingActivation => pb::ValidatorStatusCode::PendingActivation,
        ValidatorStatus::Active => pb::ValidatorStatusCode::Active,
        ValidatorStatus::Exited => pb::ValidatorStatusCode::Exited,
        ValidatorStatus::Withdrawable => pb::ValidatorStatusCode::Withdrawable,
    }
}
