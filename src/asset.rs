//! Static per-ticker asset metadata.

use std::fmt;

use crate::types::Ticker;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AssetType {
    Stock,
    Etf,
}

/// Sub-portfolio bucket used for cap/floor policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sleeve {
    Core,
    Growth,
}

/// Tax efficiency rating. Ordered from least to most efficient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TaxEfficiency {
    Low,
    Medium,
    High,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::Stock => f.pad("stock"),
            AssetType::Etf => f.pad("etf"),
        }
    }
}

impl fmt::Display for Sleeve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sleeve::Core => f.pad("core"),
            Sleeve::Growth => f.pad("growth"),
        }
    }
}

impl fmt::Display for TaxEfficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxEfficiency::Low => f.pad("low"),
            TaxEfficiency::Medium => f.pad("medium"),
            TaxEfficiency::High => f.pad("high"),
        }
    }
}

impl TaxEfficiency {
    /// Low and medium efficiency assets belong in sheltered accounts.
    #[inline]
    pub fn is_inefficient(self) -> bool {
        matches!(self, TaxEfficiency::Low | TaxEfficiency::Medium)
    }
}

/// Immutable attributes of a ticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetMeta {
    pub ticker: Ticker,
    pub asset_type: AssetType,
    pub sleeve: Sleeve,
    pub tax_efficiency: TaxEfficiency,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stabilizer: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub leveraged: bool,
}

impl AssetMeta {
    pub fn new(
        ticker: Ticker,
        asset_type: AssetType,
        sleeve: Sleeve,
        tax_efficiency: TaxEfficiency,
    ) -> Self {
        Self {
            ticker,
            asset_type,
            sleeve,
            tax_efficiency,
            stabilizer: false,
            leveraged: false,
        }
    }

    /// Mark as a volatility stabilizer.
    pub fn stabilizer(mut self) -> Self {
        self.stabilizer = true;
        self
    }

    /// Mark as a leveraged product.
    pub fn leveraged(mut self) -> Self {
        self.leveraged = true;
        self
    }

    #[inline]
    pub fn is_growth(&self) -> bool {
        self.sleeve == Sleeve::Growth
    }

    /// Single-stock limits apply to stocks held in the growth sleeve.
    #[inline]
    pub fn is_growth_stock(&self) -> bool {
        self.asset_type == AssetType::Stock && self.sleeve == Sleeve::Growth
    }
}
