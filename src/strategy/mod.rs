//! Growth-sleeve editor: add, remove and rotate target weights.
//!
//! [`StrategyEngine`] borrows a target map, the asset metadata and the
//! policy, and never mutates them. Every operation validates fully before
//! building a new map, so a [`StrategyError`] always means nothing changed.
//! Persisting an accepted edit is the caller's job; see [`store`].
//!
//! # Example
//!
//! ```
//! # use sleevebook::{AssetBook, TargetWeights, Ticker};
//! # use sleevebook::strategy::{AddAsset, StrategyEngine};
//! # use sleevebook::policy::*;
//! # fn policy() -> Policy {
//! #     Policy {
//! #         sleeves: AllocationPolicy { core_min: 0.65, growth_max: 0.30 },
//! #         stabilizer: RiskPolicy { min_pct_total: 0.15, stabilizer_tickers: vec![Ticker::new("BND")] },
//! #         growth: GrowthPolicy {
//! #             max_single_stock_weight: 0.10,
//! #             prohibit_leveraged: true,
//! #             exclusive_groups: growth::default_exclusive_groups(),
//! #         },
//! #         rebalance: RebalancePolicy { drift_absolute: 0.05, drift_relative: 0.20, max_trades: 50 },
//! #         taxable: TaxPolicy { buy_first_sell_last: true, avoid_short_term_days: 365 },
//! #     }
//! # }
//! let targets = TargetWeights::from([
//!     (Ticker::new("VTI"), 0.70),
//!     (Ticker::new("BND"), 0.20),
//!     (Ticker::new("MSFT"), 0.10),
//! ]);
//! let meta = AssetBook::default();
//! let policy = policy();
//! let engine = StrategyEngine::new(&targets, &meta, &policy);
//!
//! let edit = engine.add_asset(&AddAsset::new(Ticker::new("NVDA"), 0.05)).unwrap();
//! assert_eq!(edit.targets[&Ticker::new("NVDA")], 0.05);
//! assert_eq!(targets.len(), 3); // input untouched
//! ```

mod rules;
pub mod store;

pub use rules::{LEVERAGED_TICKERS, is_known_leveraged};
pub use store::{
    MemoryTargetStore, TargetStore, load_targets, merged_targets, save_targets, target_overrides,
};

use crate::asset::{AssetMeta, AssetType, Sleeve, TaxEfficiency};
use crate::error::StrategyError;
use crate::policy::Policy;
use crate::portfolio::{AssetBook, TargetWeights};
use crate::types::{Pct, Ticker};

/// Slack allowed on the growth cap.
const CAP_TOLERANCE: f64 = 1e-6;
/// Slack allowed on the single-stock max.
const SINGLE_TOLERANCE: f64 = 1e-9;
/// Slack allowed when checking a rotation source has enough weight.
const ROTATE_TOLERANCE: f64 = 1e-6;

/// Request to add (or resize) a growth-sleeve position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AddAsset {
    pub ticker: Ticker,
    pub weight: f64,
    pub asset_type: AssetType,
    pub sleeve: Sleeve,
    pub tax_efficiency: TaxEfficiency,
}

impl AddAsset {
    /// A growth-sleeve stock with high tax efficiency.
    pub fn new(ticker: Ticker, weight: f64) -> Self {
        Self {
            ticker,
            weight,
            asset_type: AssetType::Stock,
            sleeve: Sleeve::Growth,
            tax_efficiency: TaxEfficiency::High,
        }
    }

    pub fn asset_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = asset_type;
        self
    }

    pub fn sleeve(mut self, sleeve: Sleeve) -> Self {
        self.sleeve = sleeve;
        self
    }

    pub fn tax_efficiency(mut self, tax_efficiency: TaxEfficiency) -> Self {
        self.tax_efficiency = tax_efficiency;
        self
    }
}

/// Result of an accepted edit.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyEdit {
    /// Complete target map after the edit.
    pub targets: TargetWeights,
    /// Metadata synthesized for a ticker the universe did not know.
    pub new_meta: Option<AssetMeta>,
    pub message: String,
}

/// One growth-sleeve position, for display.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GrowthEntry {
    pub ticker: Ticker,
    pub weight: f64,
    pub asset_type: AssetType,
}

/// Growth-sleeve composition: positions by descending weight, then ticker.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GrowthSleeve {
    pub entries: Vec<GrowthEntry>,
    pub total: f64,
    pub cap: f64,
}

impl GrowthSleeve {
    /// Weight that can still be added before hitting the cap.
    pub fn headroom(&self) -> f64 {
        self.cap - self.total
    }
}

/// Validating editor over borrowed targets, metadata and policy.
#[derive(Clone, Copy, Debug)]
pub struct StrategyEngine<'a> {
    targets: &'a TargetWeights,
    asset_meta: &'a AssetBook,
    policy: &'a Policy,
}

impl<'a> StrategyEngine<'a> {
    pub fn new(targets: &'a TargetWeights, asset_meta: &'a AssetBook, policy: &'a Policy) -> Self {
        Self {
            targets,
            asset_meta,
            policy,
        }
    }

    /// Sum of target weights of tickers whose metadata puts them in growth.
    pub fn growth_weight(&self) -> f64 {
        self.targets
            .iter()
            .filter(|(t, _)| self.is_growth(t))
            .map(|(_, w)| w)
            .sum()
    }

    pub fn growth_sleeve(&self) -> GrowthSleeve {
        let mut entries: Vec<GrowthEntry> = self
            .targets
            .iter()
            .filter_map(|(&ticker, &weight)| {
                let meta = self.asset_meta.get(&ticker)?;
                meta.is_growth().then_some(GrowthEntry {
                    ticker,
                    weight,
                    asset_type: meta.asset_type,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        GrowthSleeve {
            total: entries.iter().map(|e| e.weight).sum(),
            cap: self.policy.sleeves.growth_max,
            entries,
        }
    }

    // === Edits ===

    /// Add `req.ticker` at `req.weight`, or resize it if already targeted.
    ///
    /// Only the increase over the existing weight counts against the cap.
    pub fn add_asset(&self, req: &AddAsset) -> Result<StrategyEdit, StrategyError> {
        let ticker = req.ticker;
        check_positive(req.weight)?;
        if req.sleeve != Sleeve::Growth {
            return Err(StrategyError::WrongSleeve {
                ticker,
                sleeve: req.sleeve,
            });
        }
        self.check_leveraged(&ticker)?;
        self.check_exclusive(&ticker, self.targets)?;
        self.check_single_stock(&ticker, req.weight)?;

        let existing = self.weight(&ticker);
        self.check_growth_cap(req.weight - existing)?;

        let mut targets = self.targets.clone();
        targets.insert(ticker, req.weight);
        let new_meta = (!self.asset_meta.contains_key(&ticker)).then(|| {
            AssetMeta::new(ticker, req.asset_type, req.sleeve, req.tax_efficiency)
        });

        let message = if existing > 0.0 {
            format!(
                "Updated {ticker} from {} to {}",
                Pct(existing),
                Pct(req.weight)
            )
        } else {
            format!("Added {ticker} to growth sleeve at {}", Pct(req.weight))
        };
        log::info!("{message}");
        Ok(StrategyEdit {
            targets,
            new_meta,
            message,
        })
    }

    /// Zero out `ticker`. The key stays in the map.
    pub fn remove_asset(&self, ticker: Ticker) -> Result<StrategyEdit, StrategyError> {
        let Some(&old) = self.targets.get(&ticker) else {
            return Err(StrategyError::UnknownTicker { ticker });
        };
        if self.asset_meta.get(&ticker).is_some_and(|m| !m.is_growth()) {
            return Err(StrategyError::NotGrowthSleeve { ticker });
        }

        let mut targets = self.targets.clone();
        targets.insert(ticker, 0.0);
        let message = format!("Removed {ticker} from growth sleeve (was {})", Pct(old));
        log::info!("{message}");
        Ok(StrategyEdit {
            targets,
            new_meta: None,
            message,
        })
    }

    /// Move `weight` from `from` to `to`.
    ///
    /// `to` must pass the leveraged and exclusivity checks of
    /// [`add_asset`](Self::add_asset) against the current targets, and the
    /// single-stock check at its post-rotation weight. The growth cap is not
    /// consulted: weight stays inside the sleeve.
    pub fn rotate(
        &self,
        from: Ticker,
        to: Ticker,
        weight: f64,
    ) -> Result<StrategyEdit, StrategyError> {
        check_positive(weight)?;
        let Some(&from_before) = self.targets.get(&from) else {
            return Err(StrategyError::UnknownTicker { ticker: from });
        };
        if self.asset_meta.get(&from).is_some_and(|m| !m.is_growth()) {
            return Err(StrategyError::NotGrowthSleeve { ticker: from });
        }
        if weight > from_before + ROTATE_TOLERANCE {
            return Err(StrategyError::InsufficientWeight {
                ticker: from,
                requested: weight,
                available: from_before,
            });
        }
        if from == to {
            return Ok(StrategyEdit {
                targets: self.targets.clone(),
                new_meta: None,
                message: format!("Nothing to rotate: {from} -> {to}"),
            });
        }

        self.check_leveraged(&to)?;
        self.check_exclusive(&to, self.targets)?;
        let to_before = self.weight(&to);
        let to_after = to_before + weight;
        let from_after = (from_before - weight).max(0.0);

        let mut targets = self.targets.clone();
        targets.insert(from, from_after);
        targets.insert(to, to_after);
        self.check_single_stock(&to, to_after)?;

        let new_meta = (!self.asset_meta.contains_key(&to)).then(|| {
            AssetMeta::new(to, AssetType::Stock, Sleeve::Growth, TaxEfficiency::High)
        });
        let message = format!(
            "Rotated {} from {from} to {to} ({from}: {} -> {}, {to}: {} -> {})",
            Pct(weight),
            Pct(from_before),
            Pct(from_after),
            Pct(to_before),
            Pct(to_after),
        );
        log::info!("{message}");
        Ok(StrategyEdit {
            targets,
            new_meta,
            message,
        })
    }

    // === Checks ===

    fn weight(&self, ticker: &Ticker) -> f64 {
        self.targets.get(ticker).copied().unwrap_or(0.0)
    }

    fn is_growth(&self, ticker: &Ticker) -> bool {
        self.asset_meta.get(ticker).is_some_and(|m| m.is_growth())
    }

    fn check_leveraged(&self, ticker: &Ticker) -> Result<(), StrategyError> {
        if !self.policy.growth.prohibit_leveraged {
            return Ok(());
        }
        let flagged = self.asset_meta.get(ticker).is_some_and(|m| m.leveraged);
        if flagged || is_known_leveraged(ticker) {
            return Err(StrategyError::Leveraged { ticker: *ticker });
        }
        Ok(())
    }

    /// Reject `ticker` if another member of its exclusivity group holds
    /// positive weight in `targets`.
    fn check_exclusive(
        &self,
        ticker: &Ticker,
        targets: &TargetWeights,
    ) -> Result<(), StrategyError> {
        let Some(group) = self.policy.growth.exclusive_group(ticker) else {
            return Ok(());
        };
        for other in group.iter().filter(|t| *t != ticker) {
            if targets.get(other).is_some_and(|&w| w > 0.0) {
                return Err(StrategyError::ExclusiveConflict {
                    ticker: *ticker,
                    existing: *other,
                });
            }
        }
        Ok(())
    }

    /// Growth stocks, and tickers with no metadata at all, are held to the
    /// single-stock max.
    fn check_single_stock(&self, ticker: &Ticker, weight: f64) -> Result<(), StrategyError> {
        let applies = self
            .asset_meta
            .get(ticker)
            .is_none_or(|m| m.is_growth_stock());
        let max = self.policy.growth.max_single_stock_weight;
        if applies && weight > max + SINGLE_TOLERANCE {
            return Err(StrategyError::SingleStockMax {
                ticker: *ticker,
                weight,
                max,
            });
        }
        Ok(())
    }

    fn check_growth_cap(&self, delta: f64) -> Result<(), StrategyError> {
        let current = self.growth_weight();
        let cap = self.policy.sleeves.growth_max;
        if current + delta > cap + CAP_TOLERANCE {
            return Err(StrategyError::GrowthCap {
                current,
                delta,
                cap,
            });
        }
        Ok(())
    }
}

fn check_positive(weight: f64) -> Result<(), StrategyError> {
    if !(weight > 0.0) || !weight.is_finite() {
        return Err(StrategyError::NonPositiveWeight(weight));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::fixtures::policy;

    fn t(s: &str) -> Ticker {
        Ticker::new(s)
    }

    fn book() -> AssetBook {
        [
            AssetMeta::new(t("VTI"), AssetType::Etf, Sleeve::Core, TaxEfficiency::High),
            AssetMeta::new(t("BND"), AssetType::Etf, Sleeve::Core, TaxEfficiency::Low).stabilizer(),
            AssetMeta::new(t("QQQ"), AssetType::Etf, Sleeve::Growth, TaxEfficiency::High),
            AssetMeta::new(t("SPYG"), AssetType::Etf, Sleeve::Growth, TaxEfficiency::High),
            AssetMeta::new(t("AAPL"), AssetType::Stock, Sleeve::Growth, TaxEfficiency::High),
            AssetMeta::new(t("MSFT"), AssetType::Stock, Sleeve::Growth, TaxEfficiency::High),
        ]
        .into_iter()
        .map(|m| (m.ticker, m))
        .collect()
    }

    /// Growth = QQQ 15% + AAPL 5% = 20%.
    fn targets() -> TargetWeights {
        TargetWeights::from([
            (t("VTI"), 0.60),
            (t("BND"), 0.20),
            (t("QQQ"), 0.15),
            (t("AAPL"), 0.05),
        ])
    }

    /// Growth already at its 30% cap.
    fn full_targets() -> TargetWeights {
        TargetWeights::from([
            (t("VTI"), 0.50),
            (t("BND"), 0.20),
            (t("QQQ"), 0.20),
            (t("AAPL"), 0.10),
        ])
    }

    #[test]
    fn add_new_stock() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let edit = engine.add_asset(&AddAsset::new(t("NVDA"), 0.05)).unwrap();
        assert_eq!(edit.targets[&t("NVDA")], 0.05);
        assert_eq!(edit.message, "Added NVDA to growth sleeve at 5.00%");
        let m = edit.new_meta.unwrap();
        assert_eq!(m.asset_type, AssetType::Stock);
        assert_eq!(m.sleeve, Sleeve::Growth);
        assert!(!tg.contains_key(&t("NVDA")));
    }

    #[test]
    fn resize_counts_only_the_increase() {
        let (tg, meta, pol) = (full_targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        // Shrinking a position in a full sleeve is fine.
        let edit = engine.add_asset(&AddAsset::new(t("AAPL"), 0.08)).unwrap();
        assert_eq!(edit.message, "Updated AAPL from 10.00% to 8.00%");
        assert!(edit.new_meta.is_none());
    }

    #[test]
    fn add_over_cap_fails() {
        let (tg, meta, pol) = (full_targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let err = engine.add_asset(&AddAsset::new(t("GOOGL"), 0.05)).unwrap_err();
        assert!(matches!(err, StrategyError::GrowthCap { .. }));
        assert!(err.to_string().contains("exceed cap"));
    }

    #[test]
    fn add_rejects_bad_input() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        assert_eq!(
            engine.add_asset(&AddAsset::new(t("NVDA"), 0.0)),
            Err(StrategyError::NonPositiveWeight(0.0))
        );
        assert!(matches!(
            engine.add_asset(&AddAsset::new(t("VXUS"), 0.05).sleeve(Sleeve::Core)),
            Err(StrategyError::WrongSleeve { .. })
        ));
        assert!(matches!(
            engine.add_asset(&AddAsset::new(t("TQQQ"), 0.02)),
            Err(StrategyError::Leveraged { .. })
        ));
        assert_eq!(
            engine.add_asset(&AddAsset::new(t("SPYG"), 0.02)),
            Err(StrategyError::ExclusiveConflict {
                ticker: t("SPYG"),
                existing: t("QQQ"),
            })
        );
        assert!(matches!(
            engine.add_asset(&AddAsset::new(t("MSFT"), 0.11)),
            Err(StrategyError::SingleStockMax { .. })
        ));
    }

    #[test]
    fn unknown_ticker_held_to_single_stock_max() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let req = AddAsset::new(t("ARKK"), 0.12).asset_type(AssetType::Etf);
        assert!(matches!(
            engine.add_asset(&req),
            Err(StrategyError::SingleStockMax { .. })
        ));
        // A known growth ETF is not.
        let req = AddAsset::new(t("QQQ"), 0.20).asset_type(AssetType::Etf);
        assert!(engine.add_asset(&req).is_ok());
    }

    #[test]
    fn leveraged_allowed_when_policy_permits() {
        let (tg, meta, mut pol) = (targets(), book(), policy());
        pol.growth.prohibit_leveraged = false;
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let req = AddAsset::new(t("TQQQ"), 0.02).asset_type(AssetType::Etf);
        assert!(engine.add_asset(&req).is_ok());
    }

    #[test]
    fn exclusivity_ignores_zeroed_member() {
        let mut tg = targets();
        tg.insert(t("QQQ"), 0.0);
        let (meta, pol) = (book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let req = AddAsset::new(t("SPYG"), 0.10).asset_type(AssetType::Etf);
        assert!(engine.add_asset(&req).is_ok());
    }

    #[test]
    fn remove_zeroes_but_keeps_key() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let edit = engine.remove_asset(t("AAPL")).unwrap();
        assert_eq!(edit.targets.get(&t("AAPL")), Some(&0.0));
        assert_eq!(edit.targets.len(), tg.len());
        assert_eq!(edit.message, "Removed AAPL from growth sleeve (was 5.00%)");

        assert_eq!(
            engine.remove_asset(t("NVDA")),
            Err(StrategyError::UnknownTicker { ticker: t("NVDA") })
        );
        assert_eq!(
            engine.remove_asset(t("VTI")),
            Err(StrategyError::NotGrowthSleeve { ticker: t("VTI") })
        );
    }

    #[test]
    fn rotate_moves_weight() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let edit = engine.rotate(t("QQQ"), t("MSFT"), 0.05).unwrap();
        assert!((edit.targets[&t("QQQ")] - 0.10).abs() < 1e-12);
        assert_eq!(edit.targets[&t("MSFT")], 0.05);
        assert_eq!(
            edit.message,
            "Rotated 5.00% from QQQ to MSFT (QQQ: 15.00% -> 10.00%, MSFT: 0.00% -> 5.00%)"
        );
        assert!(edit.new_meta.is_none());
    }

    #[test]
    fn rotate_into_single_stock_excess_fails() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let err = engine.rotate(t("QQQ"), t("AAPL"), 0.06).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::SingleStockMax { ticker, .. } if ticker == t("AAPL")
        ));
    }

    #[test]
    fn rotate_preconditions() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        assert!(matches!(
            engine.rotate(t("QQQ"), t("MSFT"), -0.01),
            Err(StrategyError::NonPositiveWeight(_))
        ));
        assert!(matches!(
            engine.rotate(t("NVDA"), t("MSFT"), 0.01),
            Err(StrategyError::UnknownTicker { .. })
        ));
        assert!(matches!(
            engine.rotate(t("VTI"), t("MSFT"), 0.01),
            Err(StrategyError::NotGrowthSleeve { .. })
        ));
        assert!(matches!(
            engine.rotate(t("AAPL"), t("MSFT"), 0.06),
            Err(StrategyError::InsufficientWeight { .. })
        ));
        assert!(matches!(
            engine.rotate(t("AAPL"), t("SOXL"), 0.01),
            Err(StrategyError::Leveraged { .. })
        ));
    }

    #[test]
    fn rotation_into_exclusive_partner_is_rejected() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        // Even a full move: the partner is checked against current targets.
        for weight in [0.05, 0.15] {
            assert!(matches!(
                engine.rotate(t("QQQ"), t("SPYG"), weight),
                Err(StrategyError::ExclusiveConflict { ticker, existing })
                    if ticker == t("SPYG") && existing == t("QQQ")
            ));
        }
    }

    #[test]
    fn rotate_ignores_growth_cap() {
        let (tg, meta, pol) = (full_targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let edit = engine.rotate(t("QQQ"), t("MSFT"), 0.10).unwrap();
        let e = StrategyEngine::new(&edit.targets, &meta, &pol);
        assert!((e.growth_weight() - 0.30).abs() < 1e-9);
    }

    #[test]
    fn rotate_to_new_ticker_synthesizes_meta() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let engine = StrategyEngine::new(&tg, &meta, &pol);
        let edit = engine.rotate(t("QQQ"), t("NVDA"), 0.05).unwrap();
        let m = edit.new_meta.unwrap();
        assert_eq!(m.ticker, t("NVDA"));
        assert!(m.is_growth_stock());
    }

    #[test]
    fn growth_sleeve_view() {
        let (tg, meta, pol) = (targets(), book(), policy());
        let sleeve = StrategyEngine::new(&tg, &meta, &pol).growth_sleeve();
        let order: Vec<Ticker> = sleeve.entries.iter().map(|e| e.ticker).collect();
        assert_eq!(order, vec![t("QQQ"), t("AAPL")]);
        assert!((sleeve.total - 0.20).abs() < 1e-12);
        assert!((sleeve.headroom() - 0.10).abs() < 1e-12);
    }
}
