//! Policy checks evaluated against target weights instead of holdings.

use crate::policy::{Policy, Warning};
use crate::portfolio::{AssetBook, TargetWeights};

const TOLERANCE: f64 = 1e-6;

/// Stabilizer floor, growth cap, single-stock max and leveraged ban, applied
/// to `targets`.
///
/// Used before an initial allocation. Advisory only.
pub fn validate_target_invariants(
    targets: &TargetWeights,
    asset_meta: &AssetBook,
    policy: &Policy,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let stab: f64 = policy
        .stabilizer
        .stabilizer_tickers
        .iter()
        .map(|t| targets.get(t).copied().unwrap_or(0.0))
        .sum();
    if stab < policy.stabilizer.min_pct_total - TOLERANCE {
        warnings.push(Warning::TargetStabilizerBelowMin {
            weight: stab,
            min: policy.stabilizer.min_pct_total,
        });
    }

    let growth: f64 = targets
        .iter()
        .filter(|(t, _)| asset_meta.get(*t).is_some_and(|m| m.is_growth()))
        .map(|(_, w)| w)
        .sum();
    if growth > policy.sleeves.growth_max + TOLERANCE {
        warnings.push(Warning::TargetGrowthAboveCap {
            weight: growth,
            cap: policy.sleeves.growth_max,
        });
    }

    let max_single = policy.growth.max_single_stock_weight;
    for (&ticker, &weight) in targets {
        let Some(meta) = asset_meta.get(&ticker) else {
            continue;
        };
        if meta.is_growth_stock() && weight > max_single + TOLERANCE {
            warnings.push(Warning::TargetSingleStockOverweight {
                ticker,
                weight,
                max: max_single,
            });
        }
        if policy.growth.prohibit_leveraged && meta.leveraged && weight > 0.0 {
            warnings.push(Warning::TargetLeveraged { ticker });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetMeta, AssetType, Sleeve, TaxEfficiency};
    use crate::policy::fixtures::policy;
    use crate::types::Ticker;

    fn book() -> AssetBook {
        let t = Ticker::new;
        [
            AssetMeta::new(t("VTI"), AssetType::Etf, Sleeve::Core, TaxEfficiency::High),
            AssetMeta::new(t("BND"), AssetType::Etf, Sleeve::Core, TaxEfficiency::Low).stabilizer(),
            AssetMeta::new(t("QQQ"), AssetType::Etf, Sleeve::Growth, TaxEfficiency::High),
            AssetMeta::new(t("NVDA"), AssetType::Stock, Sleeve::Growth, TaxEfficiency::High),
            AssetMeta::new(t("TQQQ"), AssetType::Etf, Sleeve::Growth, TaxEfficiency::High)
                .leveraged(),
        ]
        .into_iter()
        .map(|m| (m.ticker, m))
        .collect()
    }

    fn targets(pairs: &[(&str, f64)]) -> TargetWeights {
        pairs.iter().map(|&(t, w)| (Ticker::new(t), w)).collect()
    }

    #[test]
    fn compliant_targets() {
        let t = targets(&[("VTI", 0.55), ("BND", 0.20), ("QQQ", 0.20), ("NVDA", 0.05)]);
        assert!(validate_target_invariants(&t, &book(), &policy()).is_empty());
    }

    #[test]
    fn flags_every_target_violation() {
        let t = targets(&[
            ("VTI", 0.40),
            ("BND", 0.10),
            ("QQQ", 0.20),
            ("NVDA", 0.20),
            ("TQQQ", 0.10),
        ]);
        let w = validate_target_invariants(&t, &book(), &policy());
        assert!(w.iter().any(|w| matches!(w, Warning::TargetStabilizerBelowMin { .. })));
        assert!(w.iter().any(|w| matches!(w, Warning::TargetGrowthAboveCap { .. })));
        assert!(w.contains(&Warning::TargetSingleStockOverweight {
            ticker: Ticker::new("NVDA"),
            weight: 0.20,
            max: 0.10,
        }));
        assert!(w.contains(&Warning::TargetLeveraged {
            ticker: Ticker::new("TQQQ")
        }));
    }

    #[test]
    fn boundaries_are_tolerant() {
        // Exactly at the floor and cap.
        let t = targets(&[("VTI", 0.55), ("BND", 0.15), ("QQQ", 0.20), ("NVDA", 0.10)]);
        assert!(validate_target_invariants(&t, &book(), &policy()).is_empty());
    }
}
