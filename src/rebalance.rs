//! Rebalance orchestrator: policy checks, drift, and trade generation.

use std::fmt;
use std::str::FromStr;

use crate::drift::compute_drift;
use crate::error::PlanError;
use crate::planner::plan_trades;
use crate::policy::{
    Policy, Warning, stabilizer_weight, validate_growth_constraints, validate_sleeves,
    validate_stabilizer,
};
use crate::portfolio::Portfolio;
use crate::resolver::constraint_violation_sells;
use crate::trade::Trade;
use crate::types::Ticker;

/// How aggressively to correct drift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RebalanceMode {
    /// Correct all drift; buys and sells both allowed.
    #[default]
    Strict,
    /// Buy into compliance. Sell only to fix a hard policy violation.
    Conservative,
}

impl fmt::Display for RebalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceMode::Strict => f.pad("strict"),
            RebalanceMode::Conservative => f.pad("conservative"),
        }
    }
}

impl FromStr for RebalanceMode {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(RebalanceMode::Strict),
            "conservative" => Ok(RebalanceMode::Conservative),
            other => Err(PlanError::InvalidPolicy(format!(
                "unknown rebalance mode {other:?} (expected strict or conservative)"
            ))),
        }
    }
}

/// Diagnostics attached to every [`Recommendation`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RebalanceSummary {
    pub total_value: f64,
    pub stabilizer_weight: f64,
    pub drifted: Vec<Ticker>,
    pub num_trades: usize,
    pub mode: RebalanceMode,
}

/// Recommended trades plus advisory warnings. Nothing here is executed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Recommendation {
    pub trades: Vec<Trade>,
    pub warnings: Vec<Warning>,
    pub summary: RebalanceSummary,
}

impl Recommendation {
    /// Total dollars bought and sold.
    pub fn turnover(&self) -> (f64, f64) {
        self.trades.iter().fold((0.0, 0.0), |(b, s), t| {
            if t.action.is_buy() {
                (b + t.value, s)
            } else {
                (b, s + t.value)
            }
        })
    }
}

/// Build a rebalance recommendation for `portfolio`.
///
/// Warnings about the current state are collected first and never block
/// planning. In [`RebalanceMode::Conservative`], drift sells are dropped and
/// constraint-violation sells are placed ahead of the remaining buys.
pub fn recommend(portfolio: &Portfolio, policy: &Policy, mode: RebalanceMode) -> Recommendation {
    let mut warnings = validate_sleeves(portfolio, &policy.sleeves);
    warnings.extend(validate_stabilizer(portfolio, &policy.stabilizer));
    warnings.extend(validate_growth_constraints(portfolio, &policy.growth));
    for w in &warnings {
        log::warn!("{w}");
    }

    let drift = compute_drift(portfolio, &policy.rebalance);
    let planned = plan_trades(
        portfolio,
        &drift.drifted,
        &drift.deltas,
        policy.taxable.buy_first_sell_last,
        policy.rebalance.max_trades,
    );

    let trades = match mode {
        RebalanceMode::Strict => planned,
        RebalanceMode::Conservative => {
            let mut trades = constraint_violation_sells(portfolio, policy);
            let forced = trades.len();
            trades.extend(planned.into_iter().filter(|t| t.action.is_buy()));
            log::debug!(
                "conservative: {forced} forced sells, {} buys",
                trades.len() - forced
            );
            trades
        }
    };

    log::info!(
        "{mode} rebalance: {} drifted, {} trades",
        drift.drifted.len(),
        trades.len()
    );

    let summary = RebalanceSummary {
        total_value: portfolio.total_value(),
        stabilizer_weight: stabilizer_weight(portfolio, &policy.stabilizer.stabilizer_tickers),
        drifted: drift.drifted,
        num_trades: trades.len(),
        mode,
    };
    Recommendation {
        trades,
        warnings,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountKind};
    use crate::action::Action;
    use crate::asset::{AssetMeta, AssetType, Sleeve, TaxEfficiency};
    use crate::policy::fixtures::policy;
    use crate::portfolio::{AssetBook, TargetWeights};
    use crate::trade::TradeReason;

    fn t(s: &str) -> Ticker {
        Ticker::new(s)
    }

    fn book() -> AssetBook {
        [
            AssetMeta::new(t("VTI"), AssetType::Etf, Sleeve::Core, TaxEfficiency::High),
            AssetMeta::new(t("BND"), AssetType::Etf, Sleeve::Core, TaxEfficiency::Low).stabilizer(),
            AssetMeta::new(t("QQQ"), AssetType::Etf, Sleeve::Growth, TaxEfficiency::High),
            AssetMeta::new(t("TQQQ"), AssetType::Etf, Sleeve::Growth, TaxEfficiency::High)
                .leveraged(),
        ]
        .into_iter()
        .map(|m| (m.ticker, m))
        .collect()
    }

    fn drifted_portfolio() -> Portfolio {
        // VTI overweight, BND underweight.
        let k401 = Account::new("401k", AccountKind::TaxAdvantaged)
            .with_holding(t("VTI"), 500.0)
            .with_holding(t("BND"), 100.0);
        let taxable = Account::new("taxable", AccountKind::Taxable)
            .with_holding(t("VTI"), 200.0)
            .with_holding(t("QQQ"), 200.0);
        let targets = TargetWeights::from([(t("VTI"), 0.55), (t("BND"), 0.25), (t("QQQ"), 0.20)]);
        Portfolio::new(vec![k401, taxable], book(), targets)
    }

    #[test]
    fn mode_parse_and_display() {
        assert_eq!("strict".parse::<RebalanceMode>().unwrap(), RebalanceMode::Strict);
        assert_eq!(
            "Conservative".parse::<RebalanceMode>().unwrap(),
            RebalanceMode::Conservative
        );
        assert!("yolo".parse::<RebalanceMode>().is_err());
        assert_eq!(RebalanceMode::Conservative.to_string(), "conservative");
    }

    #[test]
    fn strict_sells_and_buys() {
        let p = drifted_portfolio();
        let rec = recommend(&p, &policy(), RebalanceMode::Strict);
        assert!(rec.trades.iter().any(|t| t.action == Action::Sell));
        assert!(rec.trades.iter().any(|t| t.action == Action::Buy));
        assert_eq!(rec.summary.num_trades, rec.trades.len());
        assert_eq!(rec.summary.mode, RebalanceMode::Strict);
        assert_eq!(rec.summary.total_value, 1000.0);
        assert!((rec.summary.stabilizer_weight - 0.10).abs() < 1e-9);
        // Stabilizer under its 15% floor.
        assert!(
            rec.warnings
                .iter()
                .any(|w| matches!(w, Warning::StabilizerBelowMin { .. }))
        );
    }

    #[test]
    fn conservative_drops_drift_sells() {
        let p = drifted_portfolio();
        let rec = recommend(&p, &policy(), RebalanceMode::Conservative);
        assert!(rec.trades.iter().all(|t| t.action == Action::Buy));
        let strict = recommend(&p, &policy(), RebalanceMode::Strict);
        let strict_buys: Vec<_> = strict.trades.into_iter().filter(|t| t.action.is_buy()).collect();
        assert_eq!(rec.trades, strict_buys);
    }

    #[test]
    fn conservative_puts_forced_sells_first() {
        let k401 = Account::new("401k", AccountKind::TaxAdvantaged)
            .with_holding(t("VTI"), 620.0)
            .with_holding(t("BND"), 100.0);
        let taxable = Account::new("taxable", AccountKind::Taxable)
            .with_holding(t("TQQQ"), 50.0)
            .with_holding(t("QQQ"), 230.0);
        let targets = TargetWeights::from([(t("VTI"), 0.55), (t("BND"), 0.25), (t("QQQ"), 0.20)]);
        let p = Portfolio::new(vec![k401, taxable], book(), targets);

        let rec = recommend(&p, &policy(), RebalanceMode::Conservative);
        let first = &rec.trades[0];
        assert_eq!(first.ticker, t("TQQQ"));
        assert_eq!(first.value, 50.0);
        assert_eq!(first.reason, TradeReason::LeveragedProhibited);
        let first_buy = rec.trades.iter().position(|t| t.action.is_buy());
        let last_sell = rec.trades.iter().rposition(|t| !t.action.is_buy());
        assert!(first_buy > last_sell);
        assert!(
            rec.warnings
                .iter()
                .any(|w| matches!(w, Warning::LeveragedHeld { .. }))
        );
    }

    #[test]
    fn in_band_portfolio_is_left_alone() {
        let k401 = Account::new("401k", AccountKind::TaxAdvantaged)
            .with_holding(t("VTI"), 550.0)
            .with_holding(t("BND"), 250.0);
        let taxable = Account::new("taxable", AccountKind::Taxable).with_holding(t("QQQ"), 200.0);
        let targets = TargetWeights::from([(t("VTI"), 0.55), (t("BND"), 0.25), (t("QQQ"), 0.20)]);
        let p = Portfolio::new(vec![k401, taxable], book(), targets);
        for mode in [RebalanceMode::Strict, RebalanceMode::Conservative] {
            let rec = recommend(&p, &policy(), mode);
            assert!(rec.trades.is_empty());
            assert!(rec.summary.drifted.is_empty());
        }
    }

    #[test]
    fn turnover_splits_buys_and_sells() {
        let p = drifted_portfolio();
        let rec = recommend(&p, &policy(), RebalanceMode::Strict);
        let (bought, sold) = rec.turnover();
        assert!(bought > 0.0 && sold > 0.0);
    }
}
