//! Parallel recommendation over many portfolios or policy variants.

use rayon::prelude::*;

use crate::policy::Policy;
use crate::portfolio::Portfolio;
use crate::rebalance::{RebalanceMode, Recommendation, recommend};

/// Recommend for each portfolio in parallel. Output order matches input.
///
/// # Example
///
/// ```ignore
/// use sleevebook::batch::recommend_many;
///
/// let recs = recommend_many(&households, &policy, RebalanceMode::Strict);
/// let busiest = recs.iter().map(|r| r.trades.len()).max();
/// ```
pub fn recommend_many(
    portfolios: &[Portfolio],
    policy: &Policy,
    mode: RebalanceMode,
) -> Vec<Recommendation> {
    portfolios
        .par_iter()
        .map(|p| recommend(p, policy, mode))
        .collect()
}

/// Sweep `(absolute, relative)` drift bands over one portfolio.
///
/// Each entry is the recommendation produced with the policy's bands
/// replaced by that pair. Useful for picking bands that trade rarely but
/// still catch real drift.
pub fn sweep_drift_bands(
    portfolio: &Portfolio,
    policy: &Policy,
    mode: RebalanceMode,
    bands: &[(f64, f64)],
) -> Vec<Recommendation> {
    bands
        .par_iter()
        .map(|&(absolute, relative)| {
            let mut policy = policy.clone();
            policy.rebalance.drift_absolute = absolute;
            policy.rebalance.drift_relative = relative;
            recommend(portfolio, &policy, mode)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountKind};
    use crate::asset::{AssetMeta, AssetType, Sleeve, TaxEfficiency};
    use crate::policy::fixtures::policy;
    use crate::portfolio::{AssetBook, TargetWeights};
    use crate::types::Ticker;

    fn portfolio(vti: f64, bnd: f64) -> Portfolio {
        let t = Ticker::new;
        let book: AssetBook = [
            AssetMeta::new(t("VTI"), AssetType::Etf, Sleeve::Core, TaxEfficiency::High),
            AssetMeta::new(t("BND"), AssetType::Etf, Sleeve::Core, TaxEfficiency::Low).stabilizer(),
        ]
        .into_iter()
        .map(|m| (m.ticker, m))
        .collect();
        let account = Account::new("ira", AccountKind::TaxAdvantaged)
            .with_holding(t("VTI"), vti)
            .with_holding(t("BND"), bnd);
        let targets = TargetWeights::from([(t("VTI"), 0.8), (t("BND"), 0.2)]);
        Portfolio::new(vec![account], book, targets)
    }

    #[test]
    fn matches_sequential() {
        let portfolios = vec![portfolio(80.0, 20.0), portfolio(90.0, 10.0), portfolio(70.0, 30.0)];
        let parallel = recommend_many(&portfolios, &policy(), RebalanceMode::Strict);
        let sequential: Vec<_> = portfolios
            .iter()
            .map(|p| recommend(p, &policy(), RebalanceMode::Strict))
            .collect();
        assert_eq!(parallel, sequential);
        assert!(parallel[0].trades.is_empty());
        assert!(!parallel[1].trades.is_empty());
    }

    #[test]
    fn wider_bands_trade_less() {
        // 6pp off target: caught by a 5pp band, missed by a 10pp band.
        let p = portfolio(86.0, 14.0);
        let recs = sweep_drift_bands(
            &p,
            &policy(),
            RebalanceMode::Strict,
            &[(0.05, 0.90), (0.10, 0.90)],
        );
        assert_eq!(recs.len(), 2);
        assert!(!recs[0].trades.is_empty());
        assert!(recs[1].trades.is_empty());
    }

    #[test]
    fn empty_input() {
        assert!(recommend_many(&[], &policy(), RebalanceMode::Strict).is_empty());
    }
}
