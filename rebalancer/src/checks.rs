//! Sanity checks on a recommended plan.
//!
//! Nothing is executed, so these guard the operator against a plan that
//! could not be carried out as written: sells larger than the holding,
//! buys an account cannot fund, oversized trades.

use rustc_hash::FxHashMap;
use serde::Serialize;
use sleevebook::{Dollars, Portfolio, Ticker, Trade};

use crate::config::ChecksConfig;

/// Slack for float noise when comparing dollar amounts.
const DOLLAR_EPSILON: f64 = 0.01;

/// Result of running all plan checks.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub checks: Vec<Check>,
}

/// A single check result.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

/// Whether a check passed, warned, or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Warn => write!(f, "WARN"),
            CheckStatus::Fail => write!(f, "FAIL"),
        }
    }
}

impl CheckReport {
    /// True if any check failed (not just warned).
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// True if any check warned.
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Warn)
    }

    fn push(&mut self, name: &'static str, status: CheckStatus, detail: String) {
        self.checks.push(Check {
            name,
            status,
            detail,
        });
    }
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PLAN CHECKS:")?;
        for check in &self.checks {
            writeln!(f, "  [{}] {}: {}", check.status, check.name, check.detail)?;
        }
        Ok(())
    }
}

/// Run all plan checks against the pre-trade `portfolio`.
pub fn check_plan(
    trades: &[Trade],
    portfolio: &Portfolio,
    config: &ChecksConfig,
    max_trades: usize,
) -> CheckReport {
    let mut report = CheckReport { checks: Vec::new() };

    // 1. Oversell: combined sells per (account, ticker) within the holding.
    let mut sold: FxHashMap<(&str, Ticker), f64> = FxHashMap::default();
    for t in trades.iter().filter(|t| !t.action.is_buy()) {
        *sold.entry((t.account_id.as_str(), t.ticker)).or_insert(0.0) += t.value;
    }
    let mut oversold: Vec<_> = sold
        .iter()
        .filter_map(|(&(account_id, ticker), &value)| {
            let held = portfolio
                .account(account_id)
                .map(|a| a.holding(&ticker))
                .unwrap_or(0.0);
            (value > held + DOLLAR_EPSILON).then_some((account_id, ticker, value, held))
        })
        .collect();
    oversold.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));
    if oversold.is_empty() {
        report.push(
            "Oversell",
            CheckStatus::Pass,
            "all sells covered by holdings".into(),
        );
    }
    for (account_id, ticker, value, held) in oversold {
        report.push(
            "Oversell",
            CheckStatus::Fail,
            format!(
                "{account_id}: sells {} {ticker} but holds {}",
                Dollars(value),
                Dollars(held)
            ),
        );
    }

    // 2. Funding: buys covered by cash plus same-account sells.
    let mut underfunded = Vec::new();
    for account in portfolio.accounts() {
        let (bought, sold) = trades
            .iter()
            .filter(|t| t.account_id == account.id)
            .fold((0.0, 0.0), |(b, s), t| {
                if t.action.is_buy() {
                    (b + t.value, s)
                } else {
                    (b, s + t.value)
                }
            });
        let available = account.cash + sold;
        if bought > available + DOLLAR_EPSILON {
            underfunded.push((account.id.as_str(), bought, available));
        }
    }
    if underfunded.is_empty() {
        report.push(
            "Funding",
            CheckStatus::Pass,
            "buys covered by cash and same-account sells".into(),
        );
    }
    for (account_id, bought, available) in underfunded {
        report.push(
            "Funding",
            CheckStatus::Warn,
            format!(
                "{account_id}: buys {} exceed cash plus sells {}",
                Dollars(bought),
                Dollars(available)
            ),
        );
    }

    // 3. Max trade size: warn on each oversized trade.
    let mut oversized = 0;
    for t in trades.iter().filter(|t| t.value > config.max_trade_usd) {
        oversized += 1;
        report.push(
            "Max trade size",
            CheckStatus::Warn,
            format!("{t}: > {} max_trade_usd", Dollars(config.max_trade_usd)),
        );
    }
    if oversized == 0 {
        report.push(
            "Max trade size",
            CheckStatus::Pass,
            format!("all trades <= {}", Dollars(config.max_trade_usd)),
        );
    }

    // 4. Min trade size
    if config.min_trade_usd > 0.0 {
        let small = trades
            .iter()
            .filter(|t| t.value < config.min_trade_usd)
            .count();
        let status = if small > 0 {
            CheckStatus::Warn
        } else {
            CheckStatus::Pass
        };
        report.push(
            "Min trade size",
            status,
            format!(
                "{small} trades below {} min_trade_usd",
                Dollars(config.min_trade_usd)
            ),
        );
    }

    // 5. Trade count
    let status = if trades.len() > max_trades {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };
    report.push(
        "Trade count",
        status,
        format!("{} trades (max_trades {max_trades})", trades.len()),
    );

    report
}
