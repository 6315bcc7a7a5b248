//! Trade planner: turns drift deltas into asset-location-aware trades.
//!
//! Sells drain tax-advantaged accounts before taxable ones; buys go to a
//! single account picked by [`select_best_account`]. No trade is ever
//! larger than what the selling account holds, and no near-zero trade is
//! emitted.

use std::collections::BTreeMap;

use crate::account::Account;
use crate::asset::AssetType;
use crate::portfolio::Portfolio;
use crate::trade::{Trade, TradeReason};
use crate::types::Ticker;

/// Dollar amounts at or below this are treated as zero.
pub const NEGLIGIBLE: f64 = 1e-6;

/// Account a BUY of `ticker` should be routed to.
///
/// Stocks and growth-sleeve assets go to the first taxable account;
/// stabilizers and low/medium tax-efficiency assets go to the first
/// tax-advantaged account. Anything else, or a preference with no matching
/// account, falls back to the first configured account. `None` only when
/// there are no accounts at all.
pub fn select_best_account<'a>(portfolio: &'a Portfolio, ticker: &Ticker) -> Option<&'a str> {
    let accounts = portfolio.accounts();
    if let Some(meta) = portfolio.meta(ticker) {
        if meta.asset_type == AssetType::Stock || meta.is_growth() {
            if let Some(a) = accounts.iter().find(|a| !a.is_tax_advantaged()) {
                return Some(&a.id);
            }
        }
        if meta.stabilizer || meta.tax_efficiency.is_inefficient() {
            if let Some(a) = accounts.iter().find(|a| a.is_tax_advantaged()) {
                return Some(&a.id);
            }
        }
    }
    accounts.first().map(|a| a.id.as_str())
}

/// Plan trades for the drifted tickers, in the order given.
///
/// * `delta < 0`: SELLs. With `taxable_sell_last`, tax-advantaged holdings
///   are drained first and taxable accounts only cover the remainder, each
///   such sell tagged [`TradeReason::TaxableLastResort`]. Without it,
///   accounts are drained in configured order.
/// * `delta > 0`: exactly one BUY of the full delta.
///
/// At most `max_trades` trades are returned; tickers late in `drifted` are
/// the ones left unaddressed when the cap is hit.
pub fn plan_trades(
    portfolio: &Portfolio,
    drifted: &[Ticker],
    deltas: &BTreeMap<Ticker, f64>,
    taxable_sell_last: bool,
    max_trades: usize,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    let accounts = portfolio.accounts();

    for ticker in drifted {
        if trades.len() >= max_trades {
            log::debug!("planner: max_trades ({max_trades}) reached before {ticker}");
            break;
        }
        let delta = deltas.get(ticker).copied().unwrap_or(0.0);
        if delta.abs() < NEGLIGIBLE {
            continue;
        }

        if delta < 0.0 {
            let need = -delta;
            let unfilled = if taxable_sell_last {
                let rest = drain_holdings(
                    accounts.iter().filter(|a| a.is_tax_advantaged()),
                    *ticker,
                    need,
                    TradeReason::RebalanceSell,
                    &mut trades,
                    max_trades,
                );
                if rest > NEGLIGIBLE {
                    drain_holdings(
                        accounts.iter().filter(|a| !a.is_tax_advantaged()),
                        *ticker,
                        rest,
                        TradeReason::TaxableLastResort,
                        &mut trades,
                        max_trades,
                    )
                } else {
                    rest
                }
            } else {
                drain_holdings(
                    accounts,
                    *ticker,
                    need,
                    TradeReason::RebalanceSell,
                    &mut trades,
                    max_trades,
                )
            };
            if unfilled > NEGLIGIBLE {
                log::debug!("planner: {ticker} sell short by {unfilled:.2}");
            }
        } else {
            match select_best_account(portfolio, ticker) {
                Some(id) => trades.push(Trade::buy(id, *ticker, delta, TradeReason::RebalanceBuy)),
                None => log::warn!("planner: no account to buy {ticker} in"),
            }
        }
    }

    trades
}

/// Tax-advantaged accounts, then taxable ones, each in configured order.
pub(crate) fn sheltered_first(accounts: &[Account]) -> impl Iterator<Item = &Account> {
    accounts
        .iter()
        .filter(|a| a.is_tax_advantaged())
        .chain(accounts.iter().filter(|a| !a.is_tax_advantaged()))
}

/// Sell up to `amount` of `ticker` from `accounts` in iteration order.
///
/// Each sell is capped by the account's holding. Stops when the amount is
/// covered or `out` holds `limit` trades. Returns what is still unsold.
pub(crate) fn drain_holdings<'a>(
    accounts: impl IntoIterator<Item = &'a Account>,
    ticker: Ticker,
    mut amount: f64,
    reason: TradeReason,
    out: &mut Vec<Trade>,
    limit: usize,
) -> f64 {
    for account in accounts {
        if amount <= NEGLIGIBLE || out.len() >= limit {
            break;
        }
        let held = account.holding(&ticker);
        if held <= 0.0 {
            continue;
        }
        let value = held.min(amount);
        out.push(Trade::sell(&account.id, ticker, value, reason));
        amount -= value;
    }
    amount
}
