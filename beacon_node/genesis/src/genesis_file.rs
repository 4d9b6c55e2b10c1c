use serde_derive::{Deserialize, Serialize};
use types::{Deposit, DepositData, Hash256};

/// One entry of a genesis file's deposit sequence (§6: "JSON document providing initial
/// deposits... and genesis time").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisDepositRecord {
    pub pubkey: types::PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub amount: u64,
    pub signature: types::SignatureBytes,
    pub proof: Vec<Hash256>,
}

impl From<GenesisDepositRecord> for Deposit {
    fn from(record: GenesisDepositRecord) -> Self {
        Deposit {
            proof: record.proof,
            data: DepositData {
                pubkey: record.pubkey,
                withdrawal_credentials: record.withdrawal_credentials,
                amount: record.amount,
                signature: record.signature,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisFile {
    pub genesis_time: u64,
    pub eth1_block_hash: Hash256,
    pub deposits: Vec<GenesisDepositRecord>,
}

impl GenesisFile {
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn into_deposits(self) -> (u64, Hash256, Vec<Deposit>) {
        let deposits = self.deposits.into_iter().map(Deposit::from).collect();
        (self.genesis_time, self.eth1_block_hash, deposits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_genesis_file() {
        let json = r#"{
            "genesis_time": 1600000000,
            "eth1_block_hash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
            "deposits": [{
                "pubkey": "0x800000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
                "withdrawal_credentials": "0x00000000000000000000000000000000000000000000000000000000000000bb",
                "amount": 32000000000,
                "signature": "0x000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
                "proof": []
            }]
        }"#;

        let file = GenesisFile::from_json(json).unwrap();
        assert_eq!(file.genesis_time, 1600000000);
        let (genesis_time, eth1_block_hash, deposits) = file.into_deposits();
        assert_eq!(genesis_time, 1600000000);
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].data.amount, 32000000000);
        assert_ne!(eth1_block_hash, Hash256::zero());
    }
}
