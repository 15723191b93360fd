use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::{Asset, OptionKind};

/* =======================
CONTRACT ADDRESSES (Base mainnet)
======================= */

const OPTION_BOOK: &str = "0xA63D2717538834E553cbe811B04a17eC748D71FB";
const OPTION_FACTORY: &str = "0x1aDcD391CF15Fb699Ed29B1D394F4A64106886e5";
const PUT_IMPLEMENTATION: &str = "0xF480F636301d50Ed570D026254dC5728b746A90F";
const CALL_IMPLEMENTATION: &str = "0x3CeB524cBA83D2D4579F5a9F8C0D1f5701dd16FE";
const USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
const WETH: &str = "0x4200000000000000000000000000000000000006";
const CBBTC: &str = "0xcbB7C0000aB88B473b1f5aFd9ef808440eed33Bf";
const ETH_PRICE_FEED: &str = "0x71041dddad3595F9CEd3DcCFBe3D1F4b0a16Bb70";
const BTC_PRICE_FEED: &str = "0x64c911996D3c6aC71f9b455B1E8E7266BcbD848F";

fn addr(s: &str) -> Address {
    // compile-time constants above are well formed
    Address::from_str(s).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractsConfig {
    pub option_book: Address,
    pub option_factory: Address,
    pub put_implementation: Address,
    pub call_implementation: Address,
    pub usdc: Address,
    pub weth: Address,
    pub cbbtc: Address,
    pub eth_price_feed: Address,
    pub btc_price_feed: Address,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            option_book: addr(OPTION_BOOK),
            option_factory: addr(OPTION_FACTORY),
            put_implementation: addr(PUT_IMPLEMENTATION),
            call_implementation: addr(CALL_IMPLEMENTATION),
            usdc: addr(USDC),
            weth: addr(WETH),
            cbbtc: addr(CBBTC),
            eth_price_feed: addr(ETH_PRICE_FEED),
            btc_price_feed: addr(BTC_PRICE_FEED),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalsConfig {
    pub usdc: u32,
    pub weth: u32,
    pub wbtc: u32,
    pub strike: u32,
}

impl Default for DecimalsConfig {
    fn default() -> Self {
        Self {
            usdc: 6,
            weth: 18,
            wbtc: 8,
            strike: 8,
        }
    }
}

/// Read-only reference data shared by the normalizer and the fill / RFQ
/// builders. Passed in explicitly so tests can swap networks or assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketConstants {
    pub contracts: ContractsConfig,
    pub decimals: DecimalsConfig,
}

impl MarketConstants {
    /// Matches a price feed address (any casing) against the known feeds.
    pub fn asset_for_price_feed(&self, price_feed: &str) -> Option<Asset> {
        let feed = price_feed.trim();
        if feed.eq_ignore_ascii_case(&hex_addr(&self.contracts.eth_price_feed)) {
            Some(Asset::Eth)
        } else if feed.eq_ignore_ascii_case(&hex_addr(&self.contracts.btc_price_feed)) {
            Some(Asset::Btc)
        } else {
            None
        }
    }

    pub fn price_feed(&self, asset: Asset) -> Address {
        match asset {
            Asset::Eth => self.contracts.eth_price_feed,
            Asset::Btc => self.contracts.btc_price_feed,
        }
    }

    /// Token locked as collateral: the underlying for calls, USDC for puts.
    pub fn collateral_token(&self, kind: OptionKind, asset: Asset) -> Address {
        match (kind, asset) {
            (OptionKind::Call, Asset::Eth) => self.contracts.weth,
            (OptionKind::Call, Asset::Btc) => self.contracts.cbbtc,
            (OptionKind::Put, _) => self.contracts.usdc,
        }
    }

    pub fn collateral_decimals(&self, kind: OptionKind, asset: Asset) -> u32 {
        match (kind, asset) {
            (OptionKind::Call, Asset::Eth) => self.decimals.weth,
            (OptionKind::Call, Asset::Btc) => self.decimals.wbtc,
            (OptionKind::Put, _) => self.decimals.usdc,
        }
    }

    pub fn implementation(&self, kind: OptionKind) -> Address {
        match kind {
            OptionKind::Call => self.contracts.call_implementation,
            OptionKind::Put => self.contracts.put_implementation,
        }
    }
}

/// Full lowercase 0x-prefixed hex (Address's Display abbreviates).
pub fn hex_addr(address: &Address) -> String {
    format!("{:?}", address)
}
