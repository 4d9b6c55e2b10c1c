use crate::deposit_tree::DepositDataTree;
use crate::errors::Error;
use crate::feed::Eth1DepositFeed;
use crate::metrics;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::convert::TryInto;
use types::{ChainSpec, Deposit, DepositData, Hash256, PublicKeyBytes, SignatureBytes};

/// Topic0 of `DepositEvent(bytes,bytes,bytes,bytes,bytes)`, fixed by the deposit contract ABI.
const DEPOSIT_EVENT_TOPIC: &str =
    "0x649bbc62d0e31342afea4e5cd82d4049e7e1ee912fc0889aa790803be39038c";

/// Speaks JSON-RPC to an ETH1 execution client over HTTP, maintaining an in-memory Merkle
/// accumulator of every deposit-contract log seen so far so that deposits handed out by
/// [`Eth1DepositFeed::deposit_logs_since`] carry a valid inclusion proof.
struct Accumulator {
    tree: DepositDataTree,
    next_scan_block: u64,
}

pub struct HttpEth1Feed {
    client: reqwest::Client,
    endpoint: String,
    deposit_contract_address: String,
    accumulator: Mutex<Accumulator>,
    log: slog::Logger,
}

impl HttpEth1Feed {
    pub fn new(
        endpoint: String,
        deposit_contract_address: String,
        deploy_block: u64,
        spec: &ChainSpec,
        log: slog::Logger,
    ) -> Self {
        HttpEth1Feed {
            client: reqwest::Client::new(),
            endpoint,
            deposit_contract_address,
            accumulator: Mutex::new(Accumulator {
                tree: DepositDataTree::new(spec.deposit_contract_tree_depth),
                next_scan_block: deploy_block,
            }),
            log,
        }
    }

    async fn rpc_call(&self, method: &'static str, params: Value) -> Result<Value, Error> {
        if let Ok(counter) = &*metrics::ETH1_RPC_REQUESTS {
            lighthouse_metrics::inc_counter_vec(counter, &[method]);
        }

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let send = async {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&body)
                .send()
                .await
                .map_err(|e| Error::Rpc(e.to_string()))?;
            let parsed: Value = response
                .json()
                .await
                .map_err(|e| Error::Rpc(e.to_string()))?;
            if let Some(error) = parsed.get("error") {
                return Err(Error::Rpc(error.to_string()));
            }
            parsed
                .get("result")
                .cloned()
                .ok_or_else(|| Error::Rpc("missing result field".into()))
        };

        let result = send.await;
        if result.is_err() {
            if let Ok(counter) = &*metrics::ETH1_RPC_ERRORS {
                lighthouse_metrics::inc_counter_vec(counter, &[method]);
            }
            slog::debug!(self.log, "eth1 rpc call failed"; "method" => method);
        }
        result
    }

    fn decode_deposit_log(data: &[u8]) -> Option<(DepositData, u64)> {
        let pubkey_bytes = read_dynamic_bytes(data, 0)?;
        let withdrawal_credentials_bytes = read_dynamic_bytes(data, 1)?;
        let amount_bytes = read_dynamic_bytes(data, 2)?;
        let signature_bytes = read_dynamic_bytes(data, 3)?;
        let index_bytes = read_dynamic_bytes(data, 4)?;

        let pubkey = PublicKeyBytes::from_slice(pubkey_bytes).ok()?;
        let withdrawal_credentials = Hash256::from_slice(withdrawal_credentials_bytes);
        let signature = SignatureBytes::from_slice(signature_bytes).ok()?;

        let mut amount_buf = [0u8; 8];
        amount_buf.copy_from_slice(amount_bytes.get(0..8)?);
        let amount = u64::from_le_bytes(amount_buf);

        let mut index_buf = [0u8; 8];
        index_buf.copy_from_slice(index_bytes.get(0..8)?);
        let index = u64::from_le_bytes(index_buf);

        Some((
            DepositData {
                pubkey,
                withdrawal_credentials,
                amount,
                signature,
            },
            index,
        ))
    }
}

/// Every field of the deposit event is ABI-encoded as a dynamic `bytes`: a head of five 32-byte
/// offsets, each pointing at a (length, payload) pair in the tail.
fn read_dynamic_bytes(data: &[u8], field: usize) -> Option<&[u8]> {
    let offset_word = data.get(field * 32..field * 32 + 32)?;
    let offset = u64::from_be_bytes(offset_word[24..32].try_into().ok()?) as usize;
    let length_word = data.get(offset..offset + 32)?;
    let length = u64::from_be_bytes(length_word[24..32].try_into().ok()?) as usize;
    data.get(offset + 32..offset + 32 + length)
}

impl Eth1DepositFeed for HttpEth1Feed {
    fn latest_block_number(&self) -> BoxFuture<'_, Result<u64, Error>> {
        async move {
            let result = self.rpc_call("eth_blockNumber", json!([])).await?;
            let hex = result.as_str().ok_or_else(|| Error::Rpc("non-string block number".into()))?;
            let height = u64::from_str_radix(hex.trim_start_matches("0x"), 16)
                .map_err(|e| Error::Rpc(e.to_string()))?;
            if let Ok(gauge) = &*metrics::ETH1_LATEST_BLOCK_NUMBER {
                lighthouse_metrics::set_gauge(gauge, height as i64);
            }
            Ok(height)
        }
        .boxed()
    }

    fn block_hash_at_height(&self, height: u64) -> BoxFuture<'_, Result<Option<Hash256>, Error>> {
        async move {
            let result = self
                .rpc_call(
                    "eth_getBlockByNumber",
                    json!([format!("0x{:x}", height), false]),
                )
                .await?;
            if result.is_null() {
                return Ok(None);
            }
            let hash_hex = result
                .get("hash")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Rpc("block missing hash".into()))?;
            let bytes = hex::decode(hash_hex.trim_start_matches("0x"))
                .map_err(|e| Error::Rpc(e.to_string()))?;
            Ok(Some(Hash256::from_slice(&bytes)))
        }
        .boxed()
    }

    fn block_number_of_hash(&self, hash: Hash256) -> BoxFuture<'_, Result<Option<u64>, Error>> {
        async move {
            let result = self
                .rpc_call(
                    "eth_getBlockByHash",
                    json!([format!("0x{}", hex::encode(hash.as_bytes())), false]),
                )
                .await?;
            if result.is_null() {
                return Ok(None);
            }
            let number_hex = result
                .get("number")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Rpc("block missing number".into()))?;
            let number = u64::from_str_radix(number_hex.trim_start_matches("0x"), 16)
                .map_err(|e| Error::Rpc(e.to_string()))?;
            Ok(Some(number))
        }
        .boxed()
    }

    fn block_timestamp_at_height(&self, height: u64) -> BoxFuture<'_, Result<Option<u64>, Error>> {
        async move {
            let result = self
                .rpc_call(
                    "eth_getBlockByNumber",
                    json!([format!("0x{:x}", height), false]),
                )
                .await?;
            if result.is_null() {
                return Ok(None);
            }
            let timestamp_hex = result
                .get("timestamp")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Rpc("block missing timestamp".into()))?;
            let timestamp = u64::from_str_radix(timestamp_hex.trim_start_matches("0x"), 16)
                .map_err(|e| Error::Rpc(e.to_string()))?;
            Ok(Some(timestamp))
        }
        .boxed()
    }

    fn deposit_logs_since(
        &self,
        from_index: u64,
    ) -> BoxFuture<'_, Result<Vec<(u64, Deposit, u64)>, Error>> {
        async move {
            let latest = self.latest_block_number().await?;
            let mut accumulator = self.accumulator.lock();
            if accumulator.next_scan_block > latest {
                return Ok(Vec::new());
            }

            let filter = json!([{
                "fromBlock": format!("0x{:x}", accumulator.next_scan_block),
                "toBlock": format!("0x{:x}", latest),
                "address": self.deposit_contract_address,
                "topics": [DEPOSIT_EVENT_TOPIC],
            }]);
            let result = self.rpc_call("eth_getLogs", filter).await?;
            let logs = result
                .as_array()
                .ok_or_else(|| Error::Rpc("eth_getLogs did not return an array".into()))?;

            let Accumulator { tree, .. } = &mut *accumulator;
            let mut out = Vec::new();
            for log in logs {
                let data_hex = log
                    .get("data")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::Rpc("log missing data".into()))?;
                let block_number_hex = log
                    .get("blockNumber")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::Rpc("log missing blockNumber".into()))?;
                let data = hex::decode(data_hex.trim_start_matches("0x"))
                    .map_err(|e| Error::Rpc(e.to_string()))?;
                let block_number =
                    u64::from_str_radix(block_number_hex.trim_start_matches("0x"), 16)
                        .map_err(|e| Error::Rpc(e.to_string()))?;

                let (deposit_data, index) = Self::decode_deposit_log(&data)
                    .ok_or_else(|| Error::Rpc("malformed deposit log".into()))?;

                if index != tree.len() {
                    return Err(Error::Rpc(format!(
                        "deposit log index {} out of order with accumulator length {}",
                        index,
                        tree.len()
                    )));
                }
                let leaf = Hash256::from_slice(&tree_hash::TreeHash::tree_hash_root(&deposit_data)[..]);
                tree.push_leaf(leaf);

                if index >= from_index {
                    let proof = tree.proof(index);
                    out.push((
                        index,
                        Deposit {
                            proof,
                            data: deposit_data,
                        },
                        block_number,
                    ));
                }
            }
            if let Ok(gauge) = &*metrics::ETH1_DEPOSITS_CACHED {
                lighthouse_metrics::set_gauge(gauge, tree.len() as i64);
            }
            accumulator.next_scan_block = latest + 1;
            out.sort_by_key(|(index, _, _)| *index);
            Ok(out)
        }
        .boxed()
    }
}
