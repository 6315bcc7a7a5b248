//! Stabilizer floor policy.

use crate::policy::Warning;
use crate::portfolio::Portfolio;
use crate::types::Ticker;

/// `[stabilizer]` section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskPolicy {
    /// Minimum aggregate weight of the stabilizer tickers.
    pub min_pct_total: f64,
    pub stabilizer_tickers: Vec<Ticker>,
}

/// Combined current weight of `stabilizer_tickers`.
pub fn stabilizer_weight(portfolio: &Portfolio, stabilizer_tickers: &[Ticker]) -> f64 {
    let total = portfolio.total_value();
    if total <= 0.0 {
        return 0.0;
    }
    let values = portfolio.current_values();
    let held: f64 = stabilizer_tickers
        .iter()
        .map(|t| values.get(t).copied().unwrap_or(0.0))
        .sum();
    held / total
}

pub fn validate_stabilizer(portfolio: &Portfolio, pol: &RiskPolicy) -> Vec<Warning> {
    let weight = stabilizer_weight(portfolio, &pol.stabilizer_tickers);
    if weight < pol.min_pct_total {
        return vec![Warning::StabilizerBelowMin {
            weight,
            min: pol.min_pct_total,
        }];
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountKind};
    use crate::portfolio::{AssetBook, TargetWeights};

    fn portfolio(ira: &[(&str, f64)], taxable: &[(&str, f64)]) -> Portfolio {
        let mut a = Account::new("401k", AccountKind::TaxAdvantaged);
        for &(t, v) in ira {
            a = a.with_holding(Ticker::new(t), v);
        }
        let mut b = Account::new("taxable", AccountKind::Taxable);
        for &(t, v) in taxable {
            b = b.with_holding(Ticker::new(t), v);
        }
        Portfolio::new(vec![a, b], AssetBook::default(), TargetWeights::new())
    }

    fn pol() -> RiskPolicy {
        RiskPolicy {
            min_pct_total: 0.15,
            stabilizer_tickers: vec![Ticker::new("BND"), Ticker::new("BNDX")],
        }
    }

    #[test]
    fn below_minimum_warns() {
        let p = portfolio(&[("BND", 10.0), ("VTI", 90.0)], &[]);
        let issues = validate_stabilizer(&p, &pol());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().to_lowercase().contains("below minimum"));
    }

    #[test]
    fn at_minimum_passes() {
        let p = portfolio(&[("BND", 15.0), ("VTI", 85.0)], &[]);
        assert!(validate_stabilizer(&p, &pol()).is_empty());
    }

    #[test]
    fn sums_all_stabilizers_across_accounts() {
        let p = portfolio(&[("BND", 100.0), ("BNDX", 50.0)], &[("VTI", 350.0)]);
        let w = stabilizer_weight(&p, &pol().stabilizer_tickers);
        assert!((w - 0.30).abs() < 1e-9);
        assert!(validate_stabilizer(&p, &pol()).is_empty());
    }
}
