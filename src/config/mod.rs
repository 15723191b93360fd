use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod contracts;
pub mod env;

pub use contracts::{ContractsConfig, DecimalsConfig, MarketConstants};

use crate::domain::{Asset, OptionKind};

/* =======================
CLI ARGS
======================= */

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the normalized order book
    Orders {
        /// Only show orders for this asset (ETH or BTC)
        #[arg(long)]
        asset: Option<Asset>,
    },

    /// Find the best protective put and show the outcome scenarios
    Protect {
        #[arg(long, default_value = "ETH")]
        asset: Asset,
        /// Portfolio value in USD
        #[arg(long)]
        portfolio: f64,
        /// Protection level in percent
        #[arg(long)]
        level: Option<u32>,
        /// Print the full payoff curve instead of the scenario table
        #[arg(long)]
        advanced: bool,
    },

    /// Print a payoff curve for an arbitrary position
    Payoff {
        #[arg(long)]
        strike: f64,
        #[arg(long)]
        premium: f64,
        #[arg(long)]
        spot: f64,
        #[arg(long, default_value = "put")]
        kind: OptionKind,
        /// Write the option instead of buying it
        #[arg(long)]
        short: bool,
        #[arg(long, default_value_t = 1.0)]
        size: f64,
    },

    /// Build the fillOrder arguments for an order id
    Fill {
        #[arg(long)]
        id: String,
        /// Collateral amount (USDC for puts, underlying for calls)
        #[arg(long)]
        size: f64,
    },

    /// Build requestForQuotation parameters
    Rfq {
        #[arg(long, default_value = "put")]
        kind: OptionKind,
        #[arg(long, default_value = "ETH")]
        asset: Asset,
        #[arg(long)]
        strike: String,
        #[arg(long)]
        size: String,
        #[arg(long, default_value_t = 7)]
        expiry_days: u32,
        /// Request a short position instead of a long one
        #[arg(long)]
        short: bool,
    },

    /// Print OHLC candles for an asset
    Chart {
        #[arg(long, default_value = "ETH")]
        asset: Asset,
        /// Lookback in days: 1, 7, 14, 30, 90, 180 or 365
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Poll the order book and log each refresh
    Watch,
}

/* =======================
MAIN CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub market: MarketConstants,
    pub protection: ProtectionConfig,
    pub chain_id: u64,
}

/* =======================
BACKEND CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub orders_url: String,
    pub prices_url: String,
    #[serde(default = "default_chart_url")]
    pub chart_url: String,

    // order book refresh cadence
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

fn default_chart_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

/* =======================
PROTECTION CONFIG
======================= */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionConfig {
    pub min_level: u32,
    pub max_level: u32,
    pub default_level: u32,
}

/* =======================
DEFAULT CONFIG
======================= */

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                orders_url: "https://round-snowflake-9c31.devops-118.workers.dev/".to_string(),
                prices_url: "https://pricing.thetanuts.finance/".to_string(),
                chart_url: default_chart_url(),
                poll_interval_ms: 30_000,
                timeout_secs: 10,
            },
            market: MarketConstants::default(),
            protection: ProtectionConfig {
                min_level: 70,
                max_level: 99,
                default_level: 90,
            },
            chain_id: 8453,
        }
    }
}

/* =======================
LOAD / CREATE CONFIG
======================= */

impl Config {
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        let mut cfg = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            let cfg = Config::default();
            let content = serde_json::to_string_pretty(&cfg)?;
            std::fs::write(path, content)?;
            cfg
        };

        cfg.apply_env_overrides();
        Ok(cfg)
    }
}
