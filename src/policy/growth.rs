//! Growth-sleeve limits: single-stock cap, leveraged ban, exclusivity groups.

use crate::policy::Warning;
use crate::portfolio::Portfolio;
use crate::types::Ticker;

/// `[growth]` section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowthPolicy {
    /// Max weight of any single growth-sleeve stock.
    pub max_single_stock_weight: f64,
    pub prohibit_leveraged: bool,
    /// Groups of tickers of which at most one may carry positive target weight.
    #[cfg_attr(feature = "serde", serde(default = "default_exclusive_groups"))]
    pub exclusive_groups: Vec<Vec<Ticker>>,
}

/// QQQ or SPYG, not both.
pub fn default_exclusive_groups() -> Vec<Vec<Ticker>> {
    vec![vec![Ticker::new("QQQ"), Ticker::new("SPYG")]]
}

impl GrowthPolicy {
    /// The exclusivity group containing `ticker`, if any.
    pub fn exclusive_group(&self, ticker: &Ticker) -> Option<&[Ticker]> {
        self.exclusive_groups
            .iter()
            .find(|g| g.contains(ticker))
            .map(Vec::as_slice)
    }
}

/// Leveraged holdings and single-stock overweights in the current state.
///
/// Every ticker that is held or targeted is examined, in ticker order.
pub fn validate_growth_constraints(portfolio: &Portfolio, pol: &GrowthPolicy) -> Vec<Warning> {
    let mut issues = Vec::new();
    for (ticker, weight) in portfolio.exposure_weights() {
        let Some(meta) = portfolio.meta(&ticker) else {
            continue;
        };
        if pol.prohibit_leveraged && meta.leveraged && weight > 0.0 {
            issues.push(Warning::LeveragedHeld { ticker });
        }
        if meta.is_growth_stock() && weight > pol.max_single_stock_weight {
            issues.push(Warning::SingleStockOverweight {
                ticker,
                weight,
                max: pol.max_single_stock_weight,
            });
        }
    }
    issues
}
