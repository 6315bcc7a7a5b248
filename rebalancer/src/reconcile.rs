//! Projected reconciliation: target weights vs the post-trade portfolio.

use serde::Serialize;
use sleevebook::{Portfolio, Trade};

/// Reconciliation report comparing projected weights against targets.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub entries: Vec<ReconcileEntry>,
    pub tracking_error_pct: f64,
}

/// One ticker's reconciliation entry.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileEntry {
    pub ticker: String,
    pub target_weight: f64,
    pub current_weight: f64,
    pub projected_weight: f64,
    pub diff_weight: f64,
}

/// Compare the portfolio after `trades` against its targets.
///
/// Covers every ticker that is targeted or held before or after the
/// trades. Tracking error is the RMS of the weight differences.
pub fn reconcile(portfolio: &Portfolio, trades: &[Trade]) -> ReconcileReport {
    let projected = portfolio.with_trades_applied(trades);
    let current = portfolio.exposure_weights();
    let after = projected.exposure_weights();

    let mut tickers: Vec<_> = current.keys().chain(after.keys()).copied().collect();
    tickers.sort();
    tickers.dedup();

    let mut entries = Vec::new();
    let mut sum_sq_diff = 0.0_f64;

    for ticker in &tickers {
        let target_weight = portfolio.targets().get(ticker).copied().unwrap_or(0.0);
        let projected_weight = after.get(ticker).copied().unwrap_or(0.0);
        let diff_weight = projected_weight - target_weight;
        sum_sq_diff += diff_weight * diff_weight;

        entries.push(ReconcileEntry {
            ticker: ticker.as_str().to_string(),
            target_weight,
            current_weight: current.get(ticker).copied().unwrap_or(0.0),
            projected_weight,
            diff_weight,
        });
    }

    let tracking_error_pct = (sum_sq_diff / tickers.len().max(1) as f64).sqrt() * 100.0;

    ReconcileReport {
        entries,
        tracking_error_pct,
    }
}

impl std::fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PROJECTED RECONCILIATION:")?;
        writeln!(
            f,
            "  {:8} {:>10} {:>10} {:>10} {:>10}",
            "Ticker", "Target%", "Current%", "After%", "Diff%"
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "  {:8} {:>9.2}% {:>9.2}% {:>9.2}% {:>+9.2}%",
                e.ticker,
                e.target_weight * 100.0,
                e.current_weight * 100.0,
                e.projected_weight * 100.0,
                e.diff_weight * 100.0,
            )?;
        }
        writeln!(f, "\n  Tracking error: {:.3}%", self.tracking_error_pct)?;
        Ok(())
    }
}
