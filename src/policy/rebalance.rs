//! Drift-band policy.

/// `[rebalance]` section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalancePolicy {
    /// Absolute weight band, e.g. 0.05 = five percentage points.
    pub drift_absolute: f64,
    /// Band relative to the target weight, e.g. 0.20 = 20% of target.
    pub drift_relative: f64,
    /// Hard cap on trades emitted by one planning pass.
    #[cfg_attr(feature = "serde", serde(default = "default_max_trades"))]
    pub max_trades: usize,
}

fn default_max_trades() -> usize {
    50
}

/// True if `current` sits outside either band around `target`.
///
/// A zero (or negative) target is never drifted.
pub fn is_drifted(current: f64, target: f64, drift_abs: f64, drift_rel: f64) -> bool {
    if target <= 0.0 {
        return false;
    }
    let abs_d = (current - target).abs();
    let rel_d = abs_d / target;
    abs_d > drift_abs || rel_d > drift_rel
}
