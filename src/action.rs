//! Trade action: Buy or Sell

use std::fmt;

/// Direction of a recommended trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    #[inline]
    pub fn is_buy(self) -> bool {
        self == Action::Buy
    }

    /// Sign applied to a holding when the trade executes.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Action::Buy => 1.0,
            Action::Sell => -1.0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}
