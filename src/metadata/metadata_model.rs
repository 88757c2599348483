use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    #[serde(rename = "ETF")]
    Etf,
    Stock,
    #[serde(rename = "Precious Metal")]
    PreciousMetal,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Bond,
    Crypto,
    #[serde(other)]
    Other,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Etf => "ETF",
            AssetClass::Stock => "Stock",
            AssetClass::PreciousMetal => "Precious Metal",
            AssetClass::RealEstate => "Real Estate",
            AssetClass::Bond => "Bond",
            AssetClass::Crypto => "Crypto",
            AssetClass::Other => "Other",
        }
    }
}

impl Default for AssetClass {
    fn default() -> Self {
        AssetClass::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    #[default]
    Medium,
    High,
}

/// Manually curated metadata for one WKN. The table is the single source of
/// truth; the pipeline never fabricates entries for unresolved identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityMetadata {
    #[serde(default)]
    pub wkn: String,
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub ticker: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub asset_class: AssetClass,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub risk_estimation: RiskTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_breakdown: Option<BTreeMap<String, Decimal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_breakdown: Option<BTreeMap<String, Decimal>>,
}

fn unknown() -> String {
    UNKNOWN_NAME.to_string()
}

impl SecurityMetadata {
    pub fn is_etf(&self) -> bool {
        self.asset_class == AssetClass::Etf
    }

    pub fn has_region_breakdown(&self) -> bool {
        self.region_breakdown
            .as_ref()
            .is_some_and(|b| !b.is_empty())
    }

    pub fn has_sector_breakdown(&self) -> bool {
        self.sector_breakdown
            .as_ref()
            .is_some_and(|b| !b.is_empty())
    }
}
