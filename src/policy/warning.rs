//! Advisory policy findings.

use std::fmt;

use crate::types::{Dollars, Pct, Ticker};

/// A policy deviation surfaced to the caller. Never blocks planning.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    CoreBelowMin { weight: f64, min: f64 },
    GrowthAboveMax { weight: f64, max: f64 },
    StabilizerBelowMin { weight: f64, min: f64 },
    LeveragedHeld { ticker: Ticker },
    SingleStockOverweight { ticker: Ticker, weight: f64, max: f64 },

    // Findings against target weights rather than holdings.
    TargetStabilizerBelowMin { weight: f64, min: f64 },
    TargetGrowthAboveCap { weight: f64, cap: f64 },
    TargetSingleStockOverweight { ticker: Ticker, weight: f64, max: f64 },
    TargetLeveraged { ticker: Ticker },

    /// Initial allocation could not place the full target amount.
    UnderAllocated { ticker: Ticker, target: f64, actual: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::CoreBelowMin { weight, min } => write!(
                f,
                "Core sleeve below minimum: {} < {}",
                Pct(*weight),
                Pct(*min)
            ),
            Warning::GrowthAboveMax { weight, max } => write!(
                f,
                "Growth sleeve above maximum: {} > {}",
                Pct(*weight),
                Pct(*max)
            ),
            Warning::StabilizerBelowMin { weight, min } => write!(
                f,
                "Stabilizer below minimum: {} < {}",
                Pct(*weight),
                Pct(*min)
            ),
            Warning::LeveragedHeld { ticker } => {
                write!(f, "Leveraged asset held long-term: {ticker}")
            }
            Warning::SingleStockOverweight { ticker, weight, max } => write!(
                f,
                "Single stock overweight: {ticker} {} > {}",
                Pct(*weight),
                Pct(*max)
            ),
            Warning::TargetStabilizerBelowMin { weight, min } => write!(
                f,
                "Target stabilizer weight {} below minimum {}",
                Pct(*weight),
                Pct(*min)
            ),
            Warning::TargetGrowthAboveCap { weight, cap } => write!(
                f,
                "Target growth sleeve {} exceeds cap {}",
                Pct(*weight),
                Pct(*cap)
            ),
            Warning::TargetSingleStockOverweight { ticker, weight, max } => write!(
                f,
                "Target weight for {ticker} ({}) exceeds single-stock max ({})",
                Pct(*weight),
                Pct(*max)
            ),
            Warning::TargetLeveraged { ticker } => {
                write!(f, "Target includes prohibited leveraged ETF: {ticker}")
            }
            Warning::UnderAllocated {
                ticker,
                target,
                actual,
            } => write!(
                f,
                "Could not fully allocate {ticker}: target {}, actual {}",
                Dollars(*target),
                Dollars(*actual)
            ),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Warning {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let w = Warning::StabilizerBelowMin {
            weight: 0.10,
            min: 0.15,
        };
        assert_eq!(w.to_string(), "Stabilizer below minimum: 10.00% < 15.00%");

        let w = Warning::UnderAllocated {
            ticker: Ticker::new("BND"),
            target: 300_000.0,
            actual: 250_000.0,
        };
        assert_eq!(
            w.to_string(),
            "Could not fully allocate BND: target $300,000, actual $250,000"
        );
    }
}
