//! Wallet signing capability.
//!
//! Permit construction needs exactly three things from a wallet: the owner address, the
//! chain id the permit is bound to, and EIP-712 typed data signing. [`TypedDataSigner`]
//! captures that capability; [`Wallet`] adapts any alloy [`Signer`] to it.

use alloy::{
    primitives::{Address, ChainId, Signature},
    providers::Provider,
    signers::Signer,
    sol_types::{Eip712Domain, SolStruct},
};

use crate::{Error, Result};

/// A connected wallet able to sign EIP-712 typed data.
///
/// Implementations are resolved once when the wallet connects. A wallet that cannot sign
/// typed data at all should report [`Error::UnsupportedSigner`] from
/// [`sign_typed_data`](TypedDataSigner::sign_typed_data).
#[allow(async_fn_in_trait)]
pub trait TypedDataSigner {
    /// Address of the account owning the key.
    fn address(&self) -> Address;

    /// Chain id the wallet is connected to.
    fn chain_id(&self) -> ChainId;

    /// Signs `payload` under `domain`.
    ///
    /// This may prompt the user out-of-band and suspend until they answer.
    async fn sign_typed_data<T>(&self, payload: &T, domain: &Eip712Domain) -> Result<Signature>
    where
        T: SolStruct + Send + Sync;
}

/// Adapter from an alloy [`Signer`] to [`TypedDataSigner`].
///
/// The chain id is taken from the signer if it carries one, otherwise it is resolved from
/// the provider at connection time and never re-queried.
#[derive(Debug, Clone)]
pub struct Wallet<S> {
    signer: S,
    chain_id: ChainId,
}

impl<S: Signer> Wallet<S> {
    /// Wraps a signer for a known chain.
    pub fn new(signer: S, chain_id: ChainId) -> Self {
        Self { signer, chain_id }
    }

    /// Wraps a signer, asking the provider for the chain id if the signer has none.
    pub async fn connect<P: Provider>(signer: S, provider: &P) -> Result<Self> {
        let chain_id = match signer.chain_id() {
            Some(chain_id) => chain_id,
            None => provider.get_chain_id().await.map_err(Error::read)?,
        };
        log::debug!("wallet {} connected on chain {chain_id}", signer.address());
        Ok(Self { signer, chain_id })
    }

    /// Returns the wrapped signer.
    pub fn inner(&self) -> &S {
        &self.signer
    }
}

impl<S> TypedDataSigner for Wallet<S>
where
    S: Signer + Send + Sync,
{
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn sign_typed_data<T>(&self, payload: &T, domain: &Eip712Domain) -> Result<Signature>
    where
        T: SolStruct + Send + Sync,
    {
        let signature = self.signer.sign_typed_data(payload, domain).await?;
        Ok(signature)
    }
}
