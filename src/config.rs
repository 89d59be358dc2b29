//! Deployment settings: where the node is and which contracts to talk to.

use std::{env, path::Path};

use alloy::primitives::Address;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{permit::DEFAULT_PERMIT_TTL, units::ETHER_DECIMALS};

/// Prefix of the environment variables read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "STAKESDK_";

/// Connection and contract settings.
///
/// Loaded from JSON with [`Config::from_json`] / [`Config::from_file`] or from
/// `STAKESDK_*` environment variables with [`Config::from_env`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub rpc_url: Url,
    pub staking_contract: Address,
    /// Token staked and deposited (`tokenB`).
    pub stake_token: Address,
    /// Token swapped in (`tokenA`).
    pub swap_token: Address,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default = "default_permit_ttl")]
    pub permit_ttl_secs: u64,
}

fn default_decimals() -> u8 {
    ETHER_DECIMALS
}

fn default_permit_ttl() -> u64 {
    DEFAULT_PERMIT_TTL
}

impl Config {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("parsing config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Reads `STAKESDK_RPC_URL`, `STAKESDK_STAKING_CONTRACT`, `STAKESDK_STAKE_TOKEN`,
    /// `STAKESDK_SWAP_TOKEN` and the optional `STAKESDK_DECIMALS` and
    /// `STAKESDK_PERMIT_TTL_SECS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let required = |name: &str| {
            var(name).with_context(|| format!("{ENV_PREFIX}{name} is not set"))
        };

        let rpc_url = required("RPC_URL")?;
        let staking_contract = required("STAKING_CONTRACT")?;
        let stake_token = required("STAKE_TOKEN")?;
        let swap_token = required("SWAP_TOKEN")?;

        Ok(Self {
            rpc_url: rpc_url
                .parse()
                .with_context(|| format!("invalid rpc url {rpc_url}"))?,
            staking_contract: staking_contract
                .parse()
                .with_context(|| format!("invalid staking contract {staking_contract}"))?,
            stake_token: stake_token
                .parse()
                .with_context(|| format!("invalid stake token {stake_token}"))?,
            swap_token: swap_token
                .parse()
                .with_context(|| format!("invalid swap token {swap_token}"))?,
            decimals: match var("DECIMALS") {
                Some(decimals) => decimals.parse().context("invalid decimals")?,
                None => default_decimals(),
            },
            permit_ttl_secs: match var("PERMIT_TTL_SECS") {
                Some(ttl) => ttl.parse().context("invalid permit ttl")?,
                None => default_permit_ttl(),
            },
        })
    }
}
