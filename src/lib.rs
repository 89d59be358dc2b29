//! # stakesdk
//!
//! A Rust SDK for a staking contract that accepts EIP-2612 permits.
//!
//! Staking and swapping happen in one transaction: the SDK signs an off-chain permit for
//! the staking contract and submits `stakeWithPermit` / `swapWithPermit`, which redeems it
//! and pulls the tokens. Depositing uses the classic `approve` + `deposit` pair.
//!
//! ## Features
//!
//! - EIP-712 permit construction and signing with any alloy signer
//! - Permit-based stake and swap, approve-based deposit, plain stake/withdraw/swap
//! - Balance reads straight from the contract, no caching
//! - Per-owner single-flight guard so two permits never race on one nonce
//! - Exact amount parsing, no floating point
//!
//! ## Quick Start
//!
//! ```no_run
//! use alloy::signers::local::PrivateKeySigner;
//! use stakesdk::{
//!     AlloyBackend, Client, address, evm,
//!     permit::Wallet,
//!     units::{ETHER_DECIMALS, parse_amount},
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let signer: PrivateKeySigner = std::env::var("PRIVATE_KEY")?.parse()?;
//! let provider = evm::connect_with_signer("http://127.0.0.1:8545".parse()?, signer.clone());
//! let wallet = Wallet::connect(signer, &provider).await?;
//!
//! let contract = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
//! let client = Client::new(AlloyBackend::new(provider), contract, Some(wallet));
//!
//! let tokens = client.tokens().await?;
//! let amount = parse_amount("100", ETHER_DECIMALS)?;
//! let receipt = client.stake_with_permit(tokens.token_b, amount).await?;
//! println!("staked in {}", receipt.tx_hash);
//!
//! let balances = client.balances(Some(client.address()?)).await?;
//! println!("staked balance: {}", balances.staked_balance);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`permit`]: EIP-2612 permit construction, signing and submission
//! - [`staking`]: staking operations, balance reads and the [`Client`]
//! - [`evm`]: contract bindings and the chain access traits
//! - [`state`]: application state for front ends
//! - [`units`]: amount conversions
//! - [`config`]: deployment settings

pub mod config;
mod error;
pub mod evm;
pub mod permit;
pub mod staking;
pub mod state;
pub mod units;

#[cfg(test)]
mod mock;

/// Re-exported primitive types from Alloy.
pub use alloy::primitives::{Address, B256, U256, address};
/// Re-exported decimal type from rust_decimal.
///
/// Used for human-readable amounts, see [`units`].
pub use rust_decimal::Decimal;

pub use config::Config;
pub use error::{Error, Result};
pub use evm::{AlloyBackend, Operation, Receipt};
pub use permit::{PermitRequest, PermitSignature, build_permit, execute_permit};
pub use staking::{
    BalanceSnapshot, Client, StakingOperation, deposit_with_approve, execute_permitted_operation,
    read_balances,
};
pub use state::{AccountState, Action};
