//! Forced sells that bring a portfolio back inside hard policy limits.
//!
//! Three rules, in this order: leveraged holdings, single-stock overweights,
//! growth-sleeve overweight. Each rule sizes its sells from the same
//! pre-trade snapshot; a sale made for one rule is not credited to the next,
//! so combined violations can be over-sold.

use crate::planner::{NEGLIGIBLE, drain_holdings, sheltered_first};
use crate::policy::Policy;
use crate::portfolio::Portfolio;
use crate::trade::{Trade, TradeReason};
use crate::types::Ticker;

/// SELL trades required to fix active constraint violations.
///
/// Considers every ticker that is held or targeted, so a leveraged position
/// with no target is still liquidated.
pub fn constraint_violation_sells(portfolio: &Portfolio, policy: &Policy) -> Vec<Trade> {
    let mut trades = Vec::new();
    let total = portfolio.total_value();
    if total <= 0.0 {
        return trades;
    }
    let weights = portfolio.exposure_weights();
    let accounts = portfolio.accounts();

    if policy.growth.prohibit_leveraged {
        for (&ticker, &weight) in &weights {
            if weight <= 0.0 || !portfolio.meta(&ticker).is_some_and(|m| m.leveraged) {
                continue;
            }
            for account in accounts {
                let held = account.holding(&ticker);
                if held > 0.0 {
                    trades.push(Trade::sell(
                        &account.id,
                        ticker,
                        held,
                        TradeReason::LeveragedProhibited,
                    ));
                }
            }
            log::debug!("resolver: liquidating leveraged {ticker}");
        }
    }

    let max_single = policy.growth.max_single_stock_weight;
    for (&ticker, &weight) in &weights {
        if !portfolio.meta(&ticker).is_some_and(|m| m.is_growth_stock()) || weight <= max_single {
            continue;
        }
        let excess = (weight - max_single) * total;
        log::debug!("resolver: {ticker} over single-stock max by {excess:.2}");
        drain_holdings(
            sheltered_first(accounts),
            ticker,
            excess,
            TradeReason::SingleStockExcess(ticker),
            &mut trades,
            usize::MAX,
        );
    }

    let mut growth: Vec<(Ticker, f64)> = weights
        .iter()
        .filter(|(t, _)| portfolio.meta(t).is_some_and(|m| m.is_growth()))
        .map(|(&t, &w)| (t, w))
        .collect();
    let growth_weight: f64 = growth.iter().map(|(_, w)| w).sum();
    if growth_weight > policy.sleeves.growth_max {
        let mut remaining = (growth_weight - policy.sleeves.growth_max) * total;
        log::debug!("resolver: growth sleeve over cap by {remaining:.2}");
        growth.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (ticker, _) in growth {
            if remaining <= NEGLIGIBLE {
                break;
            }
            remaining = drain_holdings(
                sheltered_first(accounts),
                ticker,
                remaining,
                TradeReason::GrowthSleeveExcess,
                &mut trades,
                usize::MAX,
            );
        }
    }

    trades
}
