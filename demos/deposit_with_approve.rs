//! Deposit with the two-step approve + deposit flow.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example deposit-with-approve -- \
//!   --private-key YOUR_PRIVATE_KEY \
//!   --contract 0x5FbDB2315678afecb367f032d93F642f64180aa3 \
//!   --amount 50
//! ```
//!
//! If a previous run was interrupted after the approval went through, pass `--resume` to
//! only send the deposit.

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use stakesdk::{
    AccountState, Action, AlloyBackend, Client, Config, evm, permit::Wallet, units::parse_amount,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Private key of the depositor.
    #[arg(short, long, env = "STAKESDK_PRIVATE_KEY")]
    private_key: String,
    /// Amount in whole tokens.
    #[arg(short, long, default_value = "50")]
    amount: String,
    /// Deposit against an existing allowance without approving again.
    #[arg(long)]
    resume: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = simple_logger::init_with_level(log::Level::Info);

    let args = Cli::parse();
    // STAKESDK_RPC_URL, STAKESDK_STAKING_CONTRACT, STAKESDK_STAKE_TOKEN, STAKESDK_SWAP_TOKEN
    let config = Config::from_env()?;

    let signer: PrivateKeySigner = args.private_key.parse()?;
    let provider = evm::connect_with_signer(config.rpc_url.clone(), signer.clone());
    let wallet = Wallet::connect(signer, &provider).await?;
    let client = Client::new(
        AlloyBackend::new(provider),
        config.staking_contract,
        Some(wallet),
    );

    let amount = parse_amount(&args.amount, config.decimals)?;
    let action = if args.resume {
        Action::Deposit(amount)
    } else {
        Action::DepositWithApprove(amount)
    };

    let state = client.refresh(AccountState::default()).await;
    let state = client.run(state, action).await;

    if let Some(err) = &state.last_error {
        anyhow::bail!("{action} failed: {err}");
    }
    println!("{}", serde_json::to_string_pretty(&state)?);

    Ok(())
}
