//! Stake with a single permit-based transaction.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example stake-with-permit -- \
//!   --private-key YOUR_PRIVATE_KEY \
//!   --contract 0x5FbDB2315678afecb367f032d93F642f64180aa3 \
//!   --amount 100
//! ```
//!
//! # What it does
//!
//! 1. Connects the wallet and resolves the chain id
//! 2. Reads the contract's staking token
//! 3. Signs an EIP-2612 permit for the contract and prints it
//! 4. Submits `stakeWithPermit` and waits for the receipt
//! 5. Prints the balances after the stake

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use stakesdk::{
    Address, AlloyBackend, Client, Operation, evm,
    permit::Wallet,
    staking,
    units::{ETHER_DECIMALS, parse_amount},
};
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Private key of the staker.
    #[arg(short, long, env = "STAKESDK_PRIVATE_KEY")]
    private_key: String,
    #[arg(short, long, env = "STAKESDK_RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc_url: Url,
    /// Staking contract address.
    #[arg(short, long, env = "STAKESDK_STAKING_CONTRACT")]
    contract: Address,
    /// Amount in whole tokens.
    #[arg(short, long, default_value = "100")]
    amount: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = simple_logger::init_with_level(log::Level::Debug);

    let args = Cli::parse();

    let signer: PrivateKeySigner = args.private_key.parse()?;
    let provider = evm::connect_with_signer(args.rpc_url, signer.clone());
    let wallet = Wallet::connect(signer, &provider).await?;
    let client = Client::new(AlloyBackend::new(provider), args.contract, Some(wallet));

    let owner = client.address()?;
    let token = client.tokens().await?.token_b;
    let amount = parse_amount(&args.amount, ETHER_DECIMALS)?;

    let permit = client.build_permit(token, amount, None).await?;
    println!(
        "permit: value={} nonce={} deadline={} v={} r={} s={}",
        permit.request.value,
        permit.request.nonce,
        permit.request.deadline,
        permit.v,
        permit.r,
        permit.s
    );

    let receipt =
        staking::submit_permitted(client.chain(), Operation::Stake, args.contract, &permit).await?;
    println!("staked in {} (block {:?})", receipt.tx_hash, receipt.block_number);

    let balances = client.balances(Some(owner)).await?;
    println!("{}", serde_json::to_string_pretty(&balances)?);

    Ok(())
}
