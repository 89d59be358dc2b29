//! Read-only view of the staking contract.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::{Result, evm::StakingApi, units};

/// Balances read from the staking contract at one point in time.
///
/// Amounts are in the staked token's smallest unit and serialize as decimal strings.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    /// Account the per-user fields belong to. `None` means only aggregates were read.
    pub owner: Option<Address>,
    #[serde_as(as = "DisplayFromStr")]
    pub staked_balance: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub deposited_balance: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub total_staked: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub total_deposited: U256,
}

impl BalanceSnapshot {
    /// Renders the four amounts with `decimals`, in field order.
    pub fn formatted(&self, decimals: u8) -> Result<[String; 4]> {
        Ok([
            units::format_amount(self.staked_balance, decimals)?,
            units::format_amount(self.deposited_balance, decimals)?,
            units::format_amount(self.total_staked, decimals)?,
            units::format_amount(self.total_deposited, decimals)?,
        ])
    }
}

/// Reads the current balances from `contract`.
///
/// Every call goes to the chain; nothing is cached. When `owner` is `None` the per-user
/// fields are left at zero.
pub async fn read_balances<C: StakingApi>(
    chain: &C,
    contract: Address,
    owner: Option<Address>,
) -> Result<BalanceSnapshot> {
    let (staked_balance, deposited_balance) = match owner {
        Some(owner) => (
            chain.staked_balance(contract, owner).await?,
            chain.deposited_balance(contract, owner).await?,
        ),
        None => (U256::ZERO, U256::ZERO),
    };
    let total_staked = chain.total_staked(contract).await?;
    let total_deposited = chain.total_deposited(contract).await?;

    log::debug!(
        "balances of {owner:?} on {contract}: staked={staked_balance} deposited={deposited_balance} total_staked={total_staked} total_deposited={total_deposited}"
    );

    Ok(BalanceSnapshot {
        owner,
        staked_balance,
        deposited_balance,
        total_staked,
        total_deposited,
    })
}

/// The token pair configured on a staking contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Token swapped into the contract.
    pub token_a: Address,
    /// Token staked, deposited and paid out by swaps.
    pub token_b: Address,
}

pub async fn read_tokens<C: StakingApi>(chain: &C, contract: Address) -> Result<TokenPair> {
    Ok(TokenPair {
        token_a: chain.token_a(contract).await?,
        token_b: chain.token_b(contract).await?,
    })
}
