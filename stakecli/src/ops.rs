//! Commands that sign or submit transactions.

use std::io::{Write, stdout};

use clap::Args;
use stakesdk::Address;

use crate::args::{SignerArgs, print_receipt};

/// Sign a permit for the staking contract and print its fields.
///
/// Nothing is submitted. The printed `(v, r, s)` and deadline can be passed to
/// `stakeWithPermit` / `swapWithPermit` by another sender.
///
/// # Example
///
/// ```bash
/// stakecli permit --contract 0x... --private-key $KEY --amount 100
/// ```
#[derive(Args, derive_more::Deref)]
pub struct PermitCmd {
    #[deref]
    #[command(flatten)]
    signer: SignerArgs,
    /// Token to permit. Defaults to the contract's tokenB.
    #[arg(short, long)]
    token: Option<Address>,
    /// Amount in whole tokens, e.g. `1.5`.
    #[arg(short, long)]
    amount: String,
    /// UNIX timestamp the permit expires at. Defaults to now + --permit-ttl.
    #[arg(long)]
    deadline: Option<u64>,
    /// Print the permit as JSON.
    #[arg(long)]
    json: bool,
}

impl PermitCmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.client().await?;
        let token = match self.token {
            Some(token) => token,
            None => client.tokens().await?.token_b,
        };
        let amount = self.parse_amount(&self.amount)?;
        let permit = client.build_permit(token, amount, self.deadline).await?;
        let request = permit.request;

        if self.json {
            let json = serde_json::json!({
                "token": request.token,
                "owner": request.owner,
                "spender": request.spender,
                "value": request.value.to_string(),
                "nonce": request.nonce.to_string(),
                "deadline": request.deadline,
                "v": permit.v,
                "r": permit.r,
                "s": permit.s,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        let mut writer = tabwriter::TabWriter::new(stdout());

        writeln!(&mut writer, "token\t{}", request.token)?;
        writeln!(&mut writer, "owner\t{}", request.owner)?;
        writeln!(&mut writer, "spender\t{}", request.spender)?;
        writeln!(&mut writer, "value\t{}", request.value)?;
        writeln!(&mut writer, "nonce\t{}", request.nonce)?;
        writeln!(&mut writer, "deadline\t{}", request.deadline)?;
        writeln!(&mut writer, "v\t{}", permit.v)?;
        writeln!(&mut writer, "r\t{}", permit.r)?;
        writeln!(&mut writer, "s\t{}", permit.s)?;

        writer.flush()?;

        Ok(())
    }
}

/// Stake tokenB.
///
/// Signs a permit and calls `stakeWithPermit`, one transaction. With `--no-permit` it calls
/// plain `stake`, which needs an existing allowance.
#[derive(Args, derive_more::Deref)]
pub struct StakeCmd {
    #[deref]
    #[command(flatten)]
    signer: SignerArgs,
    /// Amount in whole tokens.
    #[arg(short, long)]
    amount: String,
    #[arg(long)]
    no_permit: bool,
}

impl StakeCmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.client().await?;
        let amount = self.parse_amount(&self.amount)?;

        let receipt = if self.no_permit {
            client.stake(amount).await?
        } else {
            let token = client.tokens().await?.token_b;
            client.stake_with_permit(token, amount).await?
        };

        print_receipt(&receipt)
    }
}

/// Swap tokenA for tokenB.
///
/// Signs a permit over tokenA and calls `swapWithPermit`. With `--no-permit` it calls plain
/// `swap`, which needs an existing allowance.
#[derive(Args, derive_more::Deref)]
pub struct SwapCmd {
    #[deref]
    #[command(flatten)]
    signer: SignerArgs,
    /// Amount of tokenA in whole tokens.
    #[arg(short, long)]
    amount: String,
    #[arg(long)]
    no_permit: bool,
}

impl SwapCmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.client().await?;
        let amount = self.parse_amount(&self.amount)?;

        let receipt = if self.no_permit {
            client.swap(amount).await?
        } else {
            let token = client.tokens().await?.token_a;
            client.swap_with_permit(token, amount).await?
        };

        print_receipt(&receipt)
    }
}

/// Deposit tokenB.
///
/// Approves the contract, waits for the approval, then deposits. If a previous run stopped
/// after the approval, `--skip-approve` finishes it with the deposit alone.
#[derive(Args, derive_more::Deref)]
pub struct DepositCmd {
    #[deref]
    #[command(flatten)]
    signer: SignerArgs,
    /// Amount in whole tokens.
    #[arg(short, long)]
    amount: String,
    #[arg(long)]
    skip_approve: bool,
}

impl DepositCmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.client().await?;
        let amount = self.parse_amount(&self.amount)?;

        let receipt = if self.skip_approve {
            client.deposit(amount).await?
        } else {
            let token = client.tokens().await?.token_b;
            client.deposit_with_approve(token, amount).await?
        };

        print_receipt(&receipt)
    }
}

/// Withdraw staked tokenB.
#[derive(Args, derive_more::Deref)]
pub struct WithdrawCmd {
    #[deref]
    #[command(flatten)]
    signer: SignerArgs,
    /// Amount in whole tokens.
    #[arg(short, long)]
    amount: String,
}

impl WithdrawCmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.client().await?;
        let amount = self.parse_amount(&self.amount)?;
        let receipt = client.withdraw(amount).await?;
        print_receipt(&receipt)
    }
}
