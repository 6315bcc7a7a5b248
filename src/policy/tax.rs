//! Taxable-account trading policy.

/// `[taxable]` section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaxPolicy {
    /// Sell from tax-advantaged accounts before touching taxable ones.
    pub buy_first_sell_last: bool,
    /// Holding period under which gains would be short-term.
    pub avoid_short_term_days: u32,
}
