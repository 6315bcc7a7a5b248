//! Fixed product rules for growth-sleeve edits.

use crate::types::Ticker;

/// Leveraged and inverse ETFs rejected regardless of universe metadata.
pub const LEVERAGED_TICKERS: [&str; 18] = [
    "TQQQ", "SQQQ", "UPRO", "SPXU", "QLD", "QID", "SSO", "SDS", "UDOW", "SDOW", "TNA", "TZA",
    "LABU", "LABD", "SOXL", "SOXS", "FNGU", "FNGD",
];

#[inline]
pub fn is_known_leveraged(ticker: &Ticker) -> bool {
    LEVERAGED_TICKERS.contains(&ticker.as_str())
}
