//! Sleeve floor/cap policy.

use crate::asset::Sleeve;
use crate::policy::Warning;
use crate::portfolio::Portfolio;

/// `[sleeves]` section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationPolicy {
    /// Minimum aggregate weight of the core sleeve.
    pub core_min: f64,
    /// Maximum aggregate weight of the growth sleeve.
    pub growth_max: f64,
}

/// Aggregate weight per sleeve. Tickers without metadata count toward neither.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SleeveWeights {
    pub core: f64,
    pub growth: f64,
}

pub fn sleeve_weights(portfolio: &Portfolio) -> SleeveWeights {
    let total = portfolio.total_value();
    if total <= 0.0 {
        return SleeveWeights::default();
    }
    let mut sw = SleeveWeights::default();
    for (ticker, value) in portfolio.current_values() {
        match portfolio.meta(&ticker).map(|m| m.sleeve) {
            Some(Sleeve::Core) => sw.core += value,
            Some(Sleeve::Growth) => sw.growth += value,
            None => {}
        }
    }
    sw.core /= total;
    sw.growth /= total;
    sw
}

pub fn validate_sleeves(portfolio: &Portfolio, pol: &AllocationPolicy) -> Vec<Warning> {
    let sw = sleeve_weights(portfolio);
    let mut issues = Vec::new();
    if sw.core < pol.core_min {
        issues.push(Warning::CoreBelowMin {
            weight: sw.core,
            min: pol.core_min,
        });
    }
    if sw.growth > pol.growth_max {
        issues.push(Warning::GrowthAboveMax {
            weight: sw.growth,
            max: pol.growth_max,
        });
    }
    issues
}
