//! Print the staking contract's balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example balances -- --contract 0x5FbDB2315678afecb367f032d93F642f64180aa3 --user 0x...
//! ```

use clap::Parser;
use stakesdk::{Address, AlloyBackend, Client, evm, units::ETHER_DECIMALS};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, env = "STAKESDK_RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc_url: String,
    /// Staking contract address.
    #[arg(short, long, env = "STAKESDK_STAKING_CONTRACT")]
    contract: Address,
    /// Account to read. Only totals are shown without it.
    #[arg(short, long)]
    user: Option<Address>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = simple_logger::init_with_level(log::Level::Debug);

    let args = Cli::parse();

    let provider = evm::connect(&args.rpc_url).await?;
    let client = Client::read_only(AlloyBackend::new(provider), args.contract);

    let tokens = client.tokens().await?;
    println!("tokenA: {}", tokens.token_a);
    println!("tokenB: {}", tokens.token_b);

    let snapshot = client.balances(args.user).await?;
    let [staked, deposited, total_staked, total_deposited] = snapshot.formatted(ETHER_DECIMALS)?;
    if args.user.is_some() {
        println!("staked: {staked}");
        println!("deposited: {deposited}");
    }
    println!("total staked: {total_staked}");
    println!("total deposited: {total_deposited}");

    Ok(())
}
