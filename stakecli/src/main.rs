use clap::{Parser, Subcommand};

mod args;
mod balances;
mod ops;

use balances::{BalancesCmd, TokensCmd};
use ops::{DepositCmd, PermitCmd, StakeCmd, SwapCmd, WithdrawCmd};

#[derive(Parser)]
#[command(author, version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "STAKESDK_LOG")]
    log: log::Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show staked and deposited balances.
    Balances(BalancesCmd),
    /// Show the contract's token pair and its holdings.
    Tokens(TokensCmd),
    /// Sign a permit for the staking contract and print it without submitting.
    Permit(PermitCmd),
    /// Stake, with a permit unless --no-permit is given.
    Stake(StakeCmd),
    /// Swap tokenA for tokenB, with a permit unless --no-permit is given.
    Swap(SwapCmd),
    /// Approve and deposit.
    Deposit(DepositCmd),
    /// Withdraw staked tokens.
    Withdraw(WithdrawCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();
    let _ = simple_logger::init_with_level(args.log);

    match args.command {
        Commands::Balances(cmd) => cmd.run().await,
        Commands::Tokens(cmd) => cmd.run().await,
        Commands::Permit(cmd) => cmd.run().await,
        Commands::Stake(cmd) => cmd.run().await,
        Commands::Swap(cmd) => cmd.run().await,
        Commands::Deposit(cmd) => cmd.run().await,
        Commands::Withdraw(cmd) => cmd.run().await,
    }
}
