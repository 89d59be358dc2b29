//! Arguments shared by every command.

use std::io::{Write, stdout};

use alloy::signers::local::PrivateKeySigner;
use clap::Args;
use stakesdk::{
    Address, AlloyBackend, Client, Receipt, U256,
    evm::{self, DynProvider},
    permit::{DEFAULT_PERMIT_TTL, Wallet},
    units::{self, ETHER_DECIMALS},
};
use url::Url;

pub type EvmClient = Client<AlloyBackend<DynProvider>>;

#[derive(Args)]
pub struct ChainArgs {
    /// RPC endpoint URL.
    #[arg(
        short,
        long,
        env = "STAKESDK_RPC_URL",
        default_value = "http://127.0.0.1:8545"
    )]
    pub rpc_url: Url,
    /// Staking contract address.
    #[arg(short, long, env = "STAKESDK_STAKING_CONTRACT")]
    pub contract: Address,
    /// Decimals used to parse and print amounts.
    #[arg(long, env = "STAKESDK_DECIMALS", default_value_t = ETHER_DECIMALS)]
    pub decimals: u8,
}

impl ChainArgs {
    /// A client without a wallet.
    pub async fn read_client(&self) -> anyhow::Result<EvmClient> {
        let provider = evm::connect(self.rpc_url.as_str()).await?;
        Ok(Client::read_only(AlloyBackend::new(provider), self.contract))
    }

    pub fn parse_amount(&self, amount: &str) -> anyhow::Result<U256> {
        Ok(units::parse_amount(amount, self.decimals)?)
    }

    pub fn format_amount(&self, amount: U256) -> anyhow::Result<String> {
        Ok(units::format_amount(amount, self.decimals)?)
    }
}

#[derive(Args, derive_more::Deref)]
pub struct SignerArgs {
    #[deref]
    #[command(flatten)]
    pub chain: ChainArgs,
    /// Private key of the account signing permits and transactions.
    #[arg(long, env = "STAKESDK_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
    /// Seconds a signed permit stays valid.
    #[arg(long, env = "STAKESDK_PERMIT_TTL_SECS", default_value_t = DEFAULT_PERMIT_TTL)]
    pub permit_ttl: u64,
}

impl SignerArgs {
    /// A client signing with `--private-key`.
    pub async fn client(&self) -> anyhow::Result<EvmClient> {
        let signer: PrivateKeySigner = self.private_key.parse()?;
        let provider = evm::connect_with_signer(self.rpc_url.clone(), signer.clone());
        let wallet = Wallet::connect(signer, &provider).await?;
        log::info!("connected as {}", wallet.inner().address());

        Ok(
            Client::new(AlloyBackend::new(provider), self.contract, Some(wallet))
                .with_permit_ttl(self.permit_ttl),
        )
    }
}

pub fn print_receipt(receipt: &Receipt) -> anyhow::Result<()> {
    let mut writer = tabwriter::TabWriter::new(stdout());

    writeln!(&mut writer, "tx hash\tblock\tgas used\tstatus")?;
    writeln!(
        &mut writer,
        "{}\t{}\t{}\t{}",
        receipt.tx_hash,
        receipt
            .block_number
            .map_or_else(|| "-".to_string(), |block| block.to_string()),
        receipt.gas_used,
        if receipt.success { "ok" } else { "reverted" }
    )?;

    writer.flush()?;

    Ok(())
}
