//! Typed policy configuration and the evaluators that read it.
//!
//! A [`Policy`] is built once (usually deserialized from the policy file)
//! and validated eagerly with [`Policy::validate`]. Evaluators never fail:
//! they return advisory [`Warning`]s describing how the current state or the
//! target weights deviate from policy.

pub mod allocation;
pub mod growth;
pub mod rebalance;
pub mod risk;
pub mod targets;
pub mod tax;
mod warning;

pub use allocation::{AllocationPolicy, SleeveWeights, sleeve_weights, validate_sleeves};
pub use growth::{GrowthPolicy, validate_growth_constraints};
pub use rebalance::{RebalancePolicy, is_drifted};
pub use risk::{RiskPolicy, stabilizer_weight, validate_stabilizer};
pub use targets::validate_target_invariants;
pub use tax::TaxPolicy;
pub use warning::Warning;

use crate::error::PlanError;

/// Complete policy: one section per evaluator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Policy {
    pub sleeves: AllocationPolicy,
    pub stabilizer: RiskPolicy,
    pub growth: GrowthPolicy,
    pub rebalance: RebalancePolicy,
    pub taxable: TaxPolicy,
}

impl Policy {
    /// Validate policy invariants.
    pub fn validate(&self) -> Result<(), PlanError> {
        check_fraction("sleeves.core_min", self.sleeves.core_min)?;
        check_fraction("sleeves.growth_max", self.sleeves.growth_max)?;
        check_fraction("stabilizer.min_pct_total", self.stabilizer.min_pct_total)?;
        check_fraction(
            "growth.max_single_stock_weight",
            self.growth.max_single_stock_weight,
        )?;
        if self.growth.max_single_stock_weight <= 0.0 {
            return Err(PlanError::InvalidPolicy(
                "growth.max_single_stock_weight must be in (0.0, 1.0]".into(),
            ));
        }
        if !self.rebalance.drift_absolute.is_finite() || self.rebalance.drift_absolute < 0.0 {
            return Err(PlanError::InvalidPolicy(
                "rebalance.drift_absolute must be >= 0".into(),
            ));
        }
        if !self.rebalance.drift_relative.is_finite() || self.rebalance.drift_relative < 0.0 {
            return Err(PlanError::InvalidPolicy(
                "rebalance.drift_relative must be >= 0".into(),
            ));
        }
        if self.rebalance.max_trades == 0 {
            return Err(PlanError::InvalidPolicy(
                "rebalance.max_trades must be > 0".into(),
            ));
        }
        for group in &self.growth.exclusive_groups {
            if group.len() < 2 {
                return Err(PlanError::InvalidPolicy(format!(
                    "growth.exclusive_groups entries need at least two tickers, got {group:?}"
                )));
            }
        }
        Ok(())
    }
}

fn check_fraction(key: &str, value: f64) -> Result<(), PlanError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(PlanError::InvalidPolicy(format!(
            "{key} must be in [0.0, 1.0], got {value}"
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::policy;
    use super::*;
    use crate::types::Ticker;

    #[test]
    fn fixture_is_valid() {
        assert!(policy().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_cap() {
        let mut p = policy();
        p.sleeves.growth_max = 1.5;
        assert!(matches!(p.validate(), Err(PlanError::InvalidPolicy(_))));
    }

    #[test]
    fn rejects_zero_single_stock_max() {
        let mut p = policy();
        p.growth.max_single_stock_weight = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_negative_drift() {
        let mut p = policy();
        p.rebalance.drift_relative = -0.1;
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_zero_max_trades() {
        let mut p = policy();
        p.rebalance.max_trades = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_singleton_exclusive_group() {
        let mut p = policy();
        p.growth.exclusive_groups = vec![vec![Ticker::new("QQQ")]];
        assert!(p.validate().is_err());
    }
}
