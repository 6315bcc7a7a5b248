//! Drift detection: which targets have wandered outside their bands.

use crate::policy::{RebalancePolicy, is_drifted};
use crate::portfolio::Portfolio;
use crate::types::Ticker;

use std::collections::BTreeMap;

/// Output of [`compute_drift`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DriftResult {
    /// Drifted tickers, largest absolute dollar delta first (ties by ticker).
    pub drifted: Vec<Ticker>,
    /// Signed dollar change needed per target ticker (desired - current).
    pub deltas: BTreeMap<Ticker, f64>,
}

impl DriftResult {
    /// Dollar delta for `ticker` (0 if not a target).
    #[inline]
    pub fn delta(&self, ticker: &Ticker) -> f64 {
        self.deltas.get(ticker).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drifted.is_empty()
    }
}

/// Compare current weights against targets.
///
/// Every target ticker gets a delta; only those outside the absolute or
/// relative band are listed as drifted. Tickers held but not targeted are
/// ignored here.
pub fn compute_drift(portfolio: &Portfolio, pol: &RebalancePolicy) -> DriftResult {
    let total = portfolio.total_value();
    let values = portfolio.current_values();
    let weights = portfolio.current_weights();

    let mut deltas = BTreeMap::new();
    let mut drifted = Vec::new();
    for (&ticker, &target) in portfolio.targets() {
        let current_value = values.get(&ticker).copied().unwrap_or(0.0);
        deltas.insert(ticker, target * total - current_value);

        let current = weights.get(&ticker).copied().unwrap_or(0.0);
        if is_drifted(current, target, pol.drift_absolute, pol.drift_relative) {
            drifted.push(ticker);
        }
    }

    drifted.sort_by(|a, b| {
        let da = deltas.get(a).copied().unwrap_or(0.0).abs();
        let db = deltas.get(b).copied().unwrap_or(0.0).abs();
        db.total_cmp(&da).then_with(|| a.cmp(b))
    });

    log::debug!(
        "drift: {} of {} targets outside bands",
        drifted.len(),
        portfolio.targets().len()
    );
    DriftResult { drifted, deltas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountKind};
    use crate::portfolio::{AssetBook, TargetWeights};

    fn vti() -> Ticker {
        Ticker::new("VTI")
    }
    fn bnd() -> Ticker {
        Ticker::new("BND")
    }

    fn pol() -> RebalancePolicy {
        RebalancePolicy {
            drift_absolute: 0.05,
            drift_relative: 0.20,
            max_trades: 50,
        }
    }

    fn portfolio(holdings: &[(Ticker, f64)], targets: &[(Ticker, f64)]) -> Portfolio {
        let mut ira = Account::new("ira", AccountKind::TaxAdvantaged);
        for &(t, v) in holdings {
            ira = ira.with_holding(t, v);
        }
        Portfolio::new(
            vec![ira],
            AssetBook::default(),
            targets.iter().copied().collect::<TargetWeights>(),
        )
    }

    #[test]
    fn bond_underweight_is_drifted() {
        let p = portfolio(&[(vti(), 80.0), (bnd(), 20.0)], &[(vti(), 0.70), (bnd(), 0.30)]);
        let d = compute_drift(&p, &pol());
        // BND is 10pp and 33% off target.
        assert_eq!(d.drifted.first(), Some(&bnd()));
        assert!((d.delta(&vti()) + 10.0).abs() < 1e-9);
        assert!((d.delta(&bnd()) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn within_bands_is_quiet() {
        let p = portfolio(&[(vti(), 71.0), (bnd(), 29.0)], &[(vti(), 0.70), (bnd(), 0.30)]);
        let d = compute_drift(&p, &pol());
        assert!(d.is_empty());
        assert!((d.delta(&vti()) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_by_ticker() {
        let p = portfolio(&[(vti(), 80.0), (bnd(), 20.0)], &[(vti(), 0.70), (bnd(), 0.30)]);
        let d = compute_drift(&p, &pol());
        // Equal |delta| of $10 on both sides.
        assert_eq!(d.drifted, vec![bnd(), vti()]);
    }

    #[test]
    fn largest_shortfall_first() {
        let vxus = Ticker::new("VXUS");
        let p = portfolio(
            &[(vti(), 50.0), (vxus, 40.0), (bnd(), 10.0)],
            &[(vti(), 0.33), (vxus, 0.33), (bnd(), 0.34)],
        );
        let d = compute_drift(&p, &pol());
        assert_eq!(d.drifted[0], bnd());
    }

    #[test]
    fn untracked_target_has_full_delta() {
        let qqq = Ticker::new("QQQ");
        let p = portfolio(&[(vti(), 100.0)], &[(vti(), 0.9), (qqq, 0.1)]);
        let d = compute_drift(&p, &pol());
        assert!((d.delta(&qqq) - 10.0).abs() < 1e-9);
        assert_eq!(d.drifted[0], qqq);
    }

    #[test]
    fn zero_target_never_drifts() {
        let qqq = Ticker::new("QQQ");
        let p = portfolio(&[(vti(), 90.0), (qqq, 10.0)], &[(vti(), 1.0), (qqq, 0.0)]);
        let d = compute_drift(&p, &pol());
        assert!(!d.drifted.contains(&qqq));
        assert!((d.delta(&qqq) + 10.0).abs() < 1e-9);
    }
}
