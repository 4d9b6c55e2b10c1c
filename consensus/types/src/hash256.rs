pub use ethereum_types::H256 as Hash256;
