//! Staking and swap operations.
//!
//! The permit path signs an EIP-2612 permit for the staking contract and submits a single
//! `stakeWithPermit` / `swapWithPermit` transaction that redeems it. The deposit path has
//! no permit entry point on the contract, so it runs `approve` then `deposit` as two
//! transactions.
//!
//! The free functions take every input explicitly and keep no state, so they do not guard
//! against concurrent use. [`Client`] bundles a chain backend, the connected wallet and the
//! staking contract address, and adds the per-owner single-flight guard.

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};

use crate::{
    Error, Result,
    evm::{Operation, Receipt, StakingApi, TokenApi},
    permit::{self, DEFAULT_PERMIT_TTL, PermitSignature, TypedDataSigner, Wallet},
};

pub mod balances;
mod guard;

pub use balances::{BalanceSnapshot, TokenPair, read_balances, read_tokens};
pub use guard::{InFlight, InFlightGuard};

/// One permit-based operation, as requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakingOperation {
    pub operation: Operation,
    pub contract: Address,
    /// Token the permit authorizes.
    pub token: Address,
    /// Amount in smallest units.
    pub amount: U256,
}

impl StakingOperation {
    /// See [`execute_permitted_operation`].
    pub async fn execute<C, S>(&self, chain: &C, signer: Option<&S>) -> Result<Receipt>
    where
        C: TokenApi + StakingApi,
        S: TypedDataSigner,
    {
        execute_permitted_operation(
            chain,
            self.operation,
            self.contract,
            self.token,
            self.amount,
            signer,
        )
        .await
    }
}

/// Signs a permit for `contract` and redeems it with one `stakeWithPermit` or
/// `swapWithPermit` transaction.
///
/// Waits for the transaction to be confirmed. A revert, for an expired permit, a stale
/// nonce or an insufficient balance, is returned as [`Error::TransactionReverted`].
pub async fn execute_permitted_operation<C, S>(
    chain: &C,
    operation: Operation,
    contract: Address,
    token: Address,
    amount: U256,
    signer: Option<&S>,
) -> Result<Receipt>
where
    C: TokenApi + StakingApi,
    S: TypedDataSigner,
{
    permitted_operation(chain, operation, contract, token, amount, signer, None).await
}

/// Signs with `deadline`, or the default lifetime when `None`, then submits.
async fn permitted_operation<C, S>(
    chain: &C,
    operation: Operation,
    contract: Address,
    token: Address,
    amount: U256,
    signer: Option<&S>,
    deadline: Option<u64>,
) -> Result<Receipt>
where
    C: TokenApi + StakingApi,
    S: TypedDataSigner,
{
    let permit = permit::build_permit(chain, signer, token, contract, amount, deadline).await?;
    submit_permitted(chain, operation, contract, &permit).await
}

/// Submits an already signed permit to the staking contract.
///
/// The permit's spender must be `contract` and its owner is the sender.
pub async fn submit_permitted<C: StakingApi>(
    chain: &C,
    operation: Operation,
    contract: Address,
    permit: &PermitSignature,
) -> Result<Receipt> {
    let owner = permit.request.owner;
    let amount = permit.request.value;
    log::info!("{operation} {amount} for {owner} on {contract} with permit");

    match chain
        .with_permit(operation, contract, owner, amount, permit)
        .await
    {
        Ok(receipt) => Ok(receipt),
        Err(err) => {
            log::warn!("{operation} for {owner} failed: {err}");
            Err(err)
        }
    }
}

/// Approves `contract` for `amount` of `token`, waits for that to confirm, then deposits.
///
/// This is two transactions. If the deposit fails or the process stops after the
/// approval, the allowance stays in place and calling [`StakingApi::deposit`] again is
/// enough to finish; re-running the whole function just re-approves, which is harmless.
pub async fn deposit_with_approve<C, S>(
    chain: &C,
    contract: Address,
    token: Address,
    amount: U256,
    signer: Option<&S>,
) -> Result<Receipt>
where
    C: TokenApi + StakingApi,
    S: TypedDataSigner,
{
    let owner = signer.ok_or(Error::SignerUnavailable)?.address();
    permit::ensure_positive(amount)?;

    let approval = chain.approve(token, owner, contract, amount).await?;
    log::info!("approved {amount} of {token} for {contract}: {}", approval.tx_hash);

    chain.deposit(contract, owner, amount).await
}

/// Staking client bound to one contract.
///
/// Cheap to clone; clones share the in-flight guard.
#[derive(Debug, Clone)]
pub struct Client<C, S = Wallet<PrivateKeySigner>> {
    chain: C,
    signer: Option<S>,
    contract: Address,
    permit_ttl: u64,
    in_flight: InFlight,
}

impl<C> Client<C> {
    /// A client with no wallet: reads work, every mutation fails with
    /// [`Error::SignerUnavailable`].
    pub fn read_only(chain: C, contract: Address) -> Self {
        Self::new(chain, contract, None)
    }
}

impl<C, S> Client<C, S> {
    pub fn new(chain: C, contract: Address, signer: Option<S>) -> Self {
        Self {
            chain,
            signer,
            contract,
            permit_ttl: DEFAULT_PERMIT_TTL,
            in_flight: InFlight::default(),
        }
    }

    /// Sets how long permits signed by this client stay valid.
    pub fn with_permit_ttl(mut self, seconds: u64) -> Self {
        self.permit_ttl = seconds;
        self
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn signer(&self) -> Option<&S> {
        self.signer.as_ref()
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }
}

impl<C, S> Client<C, S>
where
    C: TokenApi + StakingApi,
    S: TypedDataSigner,
{
    fn wallet(&self) -> Result<&S> {
        self.signer.as_ref().ok_or(Error::SignerUnavailable)
    }

    /// Address of the connected wallet.
    pub fn address(&self) -> Result<Address> {
        Ok(self.wallet()?.address())
    }

    fn acquire(&self) -> Result<(&S, InFlightGuard)> {
        let wallet = self.wallet()?;
        let guard = self.in_flight.acquire(wallet.address())?;
        Ok((wallet, guard))
    }

    /// Signs a permit for this client's contract without submitting anything.
    pub async fn build_permit(
        &self,
        token: Address,
        amount: U256,
        deadline: Option<u64>,
    ) -> Result<PermitSignature> {
        let (wallet, _guard) = self.acquire()?;
        let deadline = deadline.unwrap_or_else(|| permit::deadline_after(self.permit_ttl));
        permit::build_permit(
            &self.chain,
            Some(wallet),
            token,
            self.contract,
            amount,
            Some(deadline),
        )
        .await
    }

    /// Runs one permit-based operation. See [`execute_permitted_operation`].
    pub async fn execute(&self, operation: Operation, token: Address, amount: U256) -> Result<Receipt> {
        let (wallet, _guard) = self.acquire()?;
        permitted_operation(
            &self.chain,
            operation,
            self.contract,
            token,
            amount,
            Some(wallet),
            Some(permit::deadline_after(self.permit_ttl)),
        )
        .await
    }

    pub async fn stake_with_permit(&self, token: Address, amount: U256) -> Result<Receipt> {
        self.execute(Operation::Stake, token, amount).await
    }

    pub async fn swap_with_permit(&self, token: Address, amount: U256) -> Result<Receipt> {
        self.execute(Operation::Swap, token, amount).await
    }

    /// See [`deposit_with_approve`].
    pub async fn deposit_with_approve(&self, token: Address, amount: U256) -> Result<Receipt> {
        let (wallet, _guard) = self.acquire()?;
        deposit_with_approve(&self.chain, self.contract, token, amount, Some(wallet)).await
    }

    /// Redeems a permit on its token, leaving a plain allowance.
    ///
    /// The transaction is sent from this client's wallet, which may relay a permit signed by
    /// another account.
    pub async fn execute_permit(&self, permit: &PermitSignature) -> Result<Receipt> {
        let (wallet, _guard) = self.acquire()?;
        permit::execute_permit(&self.chain, wallet.address(), permit).await
    }

    pub async fn approve(&self, token: Address, amount: U256) -> Result<Receipt> {
        let owner = self.address()?;
        self.chain.approve(token, owner, self.contract, amount).await
    }

    pub async fn transfer(&self, token: Address, to: Address, amount: U256) -> Result<Receipt> {
        let owner = self.address()?;
        permit::ensure_positive(amount)?;
        self.chain.transfer(token, owner, to, amount).await
    }

    /// `stake` without a permit; needs an existing allowance.
    pub async fn stake(&self, amount: U256) -> Result<Receipt> {
        let owner = self.address()?;
        permit::ensure_positive(amount)?;
        self.chain.stake(self.contract, owner, amount).await
    }

    /// `deposit` without approving first; needs an existing allowance.
    pub async fn deposit(&self, amount: U256) -> Result<Receipt> {
        let owner = self.address()?;
        permit::ensure_positive(amount)?;
        self.chain.deposit(self.contract, owner, amount).await
    }

    pub async fn withdraw(&self, amount: U256) -> Result<Receipt> {
        let owner = self.address()?;
        permit::ensure_positive(amount)?;
        self.chain.withdraw(self.contract, owner, amount).await
    }

    /// `swap` without a permit; needs an existing allowance on `tokenA`.
    pub async fn swap(&self, amount: U256) -> Result<Receipt> {
        let owner = self.address()?;
        permit::ensure_positive(amount)?;
        self.chain.swap(self.contract, owner, amount).await
    }
}

impl<C: StakingApi, S> Client<C, S> {
    /// Reads balances for `owner`, or aggregates only when `owner` is `None`.
    pub async fn balances(&self, owner: Option<Address>) -> Result<BalanceSnapshot> {
        read_balances(&self.chain, self.contract, owner).await
    }

    pub async fn tokens(&self) -> Result<TokenPair> {
        read_tokens(&self.chain, self.contract).await
    }

    /// The contract's own balance of `token`.
    pub async fn contract_token_balance(&self, token: Address) -> Result<U256> {
        self.chain.token_balance(self.contract, token).await
    }
}
