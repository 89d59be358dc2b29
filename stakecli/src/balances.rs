//! Read-only commands.

use std::io::{Write, stdout};

use clap::Args;
use stakesdk::Address;

use crate::args::ChainArgs;

/// Show staked and deposited balances of the staking contract.
///
/// # Example
///
/// ```bash
/// stakecli balances --contract 0x5FbDB2315678afecb367f032d93F642f64180aa3 --user 0x...
/// ```
///
/// Without `--user` only the totals are read and the per-user columns show zero.
#[derive(Args, derive_more::Deref)]
pub struct BalancesCmd {
    #[deref]
    #[command(flatten)]
    chain: ChainArgs,
    /// Account to read balances for.
    #[arg(short, long)]
    user: Option<Address>,
}

impl BalancesCmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.read_client().await?;
        let snapshot = client.balances(self.user).await?;
        let [staked, deposited, total_staked, total_deposited] =
            snapshot.formatted(self.decimals)?;

        let mut writer = tabwriter::TabWriter::new(stdout());

        writeln!(
            &mut writer,
            "staked\tdeposited\ttotal staked\ttotal deposited"
        )?;
        writeln!(
            &mut writer,
            "{staked}\t{deposited}\t{total_staked}\t{total_deposited}"
        )?;

        writer.flush()?;

        Ok(())
    }
}

/// Show the contract's token pair and how much of each it holds.
#[derive(Args, derive_more::Deref)]
pub struct TokensCmd {
    #[deref]
    #[command(flatten)]
    chain: ChainArgs,
}

impl TokensCmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.read_client().await?;
        let tokens = client.tokens().await?;

        let mut writer = tabwriter::TabWriter::new(stdout());

        writeln!(&mut writer, "role\ttoken\tcontract balance")?;
        for (role, token) in [("tokenA", tokens.token_a), ("tokenB", tokens.token_b)] {
            let balance = client.contract_token_balance(token).await?;
            writeln!(
                &mut writer,
                "{role}\t{token}\t{}",
                self.format_amount(balance)?
            )?;
        }

        writer.flush()?;

        Ok(())
    }
}
