use alloy::primitives::{Address, U256};

use super::Receipt;
use crate::{Result, permit::PermitSignature};

/// Permit-consuming entry points of the staking contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Operation {
    /// `stakeWithPermit`: pulls `tokenB` and credits the staked balance.
    #[display("stake")]
    Stake,
    /// `swapWithPermit`: pulls `tokenA` and pays out `tokenB` 1:1.
    #[display("swap")]
    Swap,
}

/// Calls against an EIP-2612 token.
///
/// Transactions are sent from `from`, which must be an account the backend can sign for.
/// Every transaction method waits for one confirmation.
#[allow(async_fn_in_trait)]
pub trait TokenApi {
    async fn name(&self, token: Address) -> Result<String>;

    async fn decimals(&self, token: Address) -> Result<u8>;

    /// Current permit nonce of `owner`.
    async fn nonces(&self, token: Address, owner: Address) -> Result<U256>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn approve(
        &self,
        token: Address,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Receipt>;

    async fn transfer(&self, token: Address, from: Address, to: Address, amount: U256)
    -> Result<Receipt>;

    /// Redeems `permit` on its token.
    async fn permit(&self, from: Address, permit: &PermitSignature) -> Result<Receipt>;
}

/// Calls against the staking contract.
#[allow(async_fn_in_trait)]
pub trait StakingApi {
    async fn token_a(&self, contract: Address) -> Result<Address>;

    async fn token_b(&self, contract: Address) -> Result<Address>;

    async fn staked_balance(&self, contract: Address, user: Address) -> Result<U256>;

    async fn deposited_balance(&self, contract: Address, user: Address) -> Result<U256>;

    async fn total_staked(&self, contract: Address) -> Result<U256>;

    async fn total_deposited(&self, contract: Address) -> Result<U256>;

    /// Contract's own balance of `token`.
    async fn token_balance(&self, contract: Address, token: Address) -> Result<U256>;

    async fn stake(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt>;

    async fn deposit(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt>;

    async fn withdraw(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt>;

    async fn swap(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt>;

    /// Submits `stakeWithPermit` or `swapWithPermit` with the permit's `(deadline, v, r, s)`.
    async fn with_permit(
        &self,
        operation: Operation,
        contract: Address,
        from: Address,
        amount: U256,
        permit: &PermitSignature,
    ) -> Result<Receipt>;
}
