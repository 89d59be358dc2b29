//! EVM plumbing: contract bindings, providers and the chain access traits.
//!
//! The permit and staking logic never talks to a provider directly. It goes through
//! [`TokenApi`] and [`StakingApi`], which [`AlloyBackend`] implements on top of any alloy
//! [`Provider`].

use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::B256,
    providers::ProviderBuilder,
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::TransportError,
};
use serde::{Deserialize, Serialize};
use url::Url;

mod api;
mod backend;
pub mod contracts;

pub use alloy::providers::{DynProvider, Provider};
pub use api::{Operation, StakingApi, TokenApi};
pub use backend::AlloyBackend;

/// Outcome of a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx_hash: B256,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl From<&TransactionReceipt> for Receipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash(),
            success: receipt.status(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        }
    }
}

/// Creates a read-only provider for `url`.
pub async fn connect(url: &str) -> Result<DynProvider<Ethereum>, TransportError> {
    let provider = ProviderBuilder::new().connect(url).await?;
    Ok(provider.erased())
}

/// Creates a provider that signs and submits transactions with `signer`.
pub fn connect_with_signer(url: Url, signer: PrivateKeySigner) -> DynProvider<Ethereum> {
    ProviderBuilder::new()
        .wallet(signer)
        .connect_http(url)
        .erased()
}
