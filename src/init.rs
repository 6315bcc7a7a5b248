//! Initial allocation: place a lump sum across accounts by asset location.
//!
//! Two passes. The first routes each ticker's full target amount to its
//! preferred account, capped by that account's cash. The second sweeps any
//! shortfall into whichever accounts still have cash, in account order.

use std::collections::BTreeMap;

use crate::account::{Account, AccountKind};
use crate::asset::{AssetMeta, Sleeve, TaxEfficiency};
use crate::error::PlanError;
use crate::policy::{Policy, Warning, validate_target_invariants};
use crate::portfolio::{AssetBook, TargetWeights, check_target_sum};
use crate::trade::{Placement, Trade, TradeReason};
use crate::types::Ticker;

/// Targets may miss 1.0 by this much at funding time.
pub const INIT_TARGET_TOLERANCE: f64 = 0.01;
/// Allowed gap between supplied account cash and the total to invest.
pub const CASH_TOLERANCE: f64 = 1.0;
/// Buys at or below this are noise.
const MIN_TRADE: f64 = 0.01;
/// Shortfalls above this are reported.
const SHORTFALL_WARN: f64 = 1.0;

/// Cash to invest per account id.
pub type AccountCash = BTreeMap<String, f64>;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InitSummary {
    pub total_value: f64,
    pub num_trades: usize,
    pub account_cash: AccountCash,
    pub allocated_by_account: BTreeMap<String, f64>,
    pub allocated_by_ticker: BTreeMap<Ticker, f64>,
}

impl InitSummary {
    pub fn allocated(&self) -> f64 {
        self.allocated_by_account.values().sum()
    }
}

/// BUY trades that fund the portfolio, plus advisory warnings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InitRecommendation {
    pub trades: Vec<Trade>,
    pub warnings: Vec<Warning>,
    pub summary: InitSummary,
}

/// Plan the BUYs that invest `total_value` according to `targets`.
///
/// With `account_cash = None` the total is split in proportion to each
/// account's existing value, or evenly if every account is empty.
///
/// # Errors
///
/// [`PlanError::InvalidTotal`], [`PlanError::NoAccounts`],
/// [`PlanError::TargetSum`] (tolerance 0.01),
/// [`PlanError::UnknownAccount`] for a cash entry naming no account, and
/// [`PlanError::CashMismatch`] when supplied cash misses the total by more
/// than $1.
pub fn compute_init_allocation(
    total_value: f64,
    targets: &TargetWeights,
    asset_meta: &AssetBook,
    accounts: &[Account],
    account_cash: Option<&AccountCash>,
    policy: &Policy,
) -> Result<InitRecommendation, PlanError> {
    if !total_value.is_finite() || total_value < 0.0 {
        return Err(PlanError::InvalidTotal(total_value));
    }
    if accounts.is_empty() {
        return Err(PlanError::NoAccounts);
    }
    check_target_sum(targets, INIT_TARGET_TOLERANCE)?;

    let cash = match account_cash {
        Some(cash) => {
            if let Some(id) = cash.keys().find(|id| !accounts.iter().any(|a| &a.id == *id)) {
                return Err(PlanError::UnknownAccount(id.clone()));
            }
            cash.clone()
        }
        None => default_cash(total_value, accounts),
    };
    let cash_sum: f64 = cash.values().sum();
    if (cash_sum - total_value).abs() > CASH_TOLERANCE {
        return Err(PlanError::CashMismatch {
            cash: cash_sum,
            total: total_value,
        });
    }

    let mut warnings = validate_target_invariants(targets, asset_meta, policy);
    let trades = allocate(total_value, targets, asset_meta, accounts, &cash);

    let mut allocated_by_account = BTreeMap::new();
    let mut allocated_by_ticker = BTreeMap::new();
    for t in &trades {
        *allocated_by_account.entry(t.account_id.clone()).or_insert(0.0) += t.value;
        *allocated_by_ticker.entry(t.ticker).or_insert(0.0) += t.value;
    }

    for (&ticker, &weight) in targets {
        let target = weight * total_value;
        let actual = allocated_by_ticker.get(&ticker).copied().unwrap_or(0.0);
        if (actual - target).abs() > SHORTFALL_WARN {
            warnings.push(Warning::UnderAllocated {
                ticker,
                target,
                actual,
            });
        }
    }
    for w in &warnings {
        log::warn!("{w}");
    }
    log::info!(
        "init: {} trades across {} accounts",
        trades.len(),
        allocated_by_account.len()
    );

    let summary = InitSummary {
        total_value,
        num_trades: trades.len(),
        account_cash: cash,
        allocated_by_account,
        allocated_by_ticker,
    };
    Ok(InitRecommendation {
        trades,
        warnings,
        summary,
    })
}

/// Heuristic cash split for funding new accounts.
///
/// Tax-advantaged accounts get `clamp(stabilizer + low-efficiency target
/// weight + 0.10, 0.30, 0.70)` of the total, shared evenly; taxable accounts
/// share the rest. If one kind of account is missing, the other gets it all.
pub fn suggested_cash_split(
    total_value: f64,
    targets: &TargetWeights,
    asset_meta: &AssetBook,
    accounts: &[Account],
    policy: &Policy,
) -> AccountCash {
    let sheltered: Vec<&Account> = accounts.iter().filter(|a| a.is_tax_advantaged()).collect();
    let taxable: Vec<&Account> = accounts.iter().filter(|a| !a.is_tax_advantaged()).collect();

    let sheltered_pct = if taxable.is_empty() {
        1.0
    } else if sheltered.is_empty() {
        0.0
    } else {
        let stab: f64 = policy
            .stabilizer
            .stabilizer_tickers
            .iter()
            .map(|t| targets.get(t).copied().unwrap_or(0.0))
            .sum();
        let low_eff: f64 = targets
            .iter()
            .filter(|(t, _)| {
                asset_meta
                    .get(*t)
                    .is_some_and(|m| m.tax_efficiency == TaxEfficiency::Low && !m.stabilizer)
            })
            .map(|(_, w)| w)
            .sum();
        (stab + low_eff + 0.10).clamp(0.30, 0.70)
    };

    let mut cash = AccountCash::new();
    let sheltered_total = total_value * sheltered_pct;
    for a in &sheltered {
        cash.insert(a.id.clone(), sheltered_total / sheltered.len() as f64);
    }
    for a in &taxable {
        cash.insert(
            a.id.clone(),
            (total_value - sheltered_total) / taxable.len() as f64,
        );
    }
    cash
}

fn default_cash(total_value: f64, accounts: &[Account]) -> AccountCash {
    let existing: f64 = accounts.iter().map(Account::total_value).sum();
    accounts
        .iter()
        .map(|a| {
            let share = if existing > 0.0 {
                a.total_value() / existing
            } else {
                1.0 / accounts.len() as f64
            };
            (a.id.clone(), total_value * share)
        })
        .collect()
}

/// Stabilizers, then least tax-efficient, then core before growth, then
/// ticker. Tickers without metadata go last.
fn priority(ticker: Ticker, meta: Option<&AssetMeta>) -> (u8, u8, u8, Ticker) {
    match meta {
        None => (2, 0, 0, ticker),
        Some(m) => (
            u8::from(!m.stabilizer),
            match m.tax_efficiency {
                TaxEfficiency::Low => 0,
                TaxEfficiency::Medium => 1,
                TaxEfficiency::High => 2,
            },
            match m.sleeve {
                Sleeve::Core => 0,
                Sleeve::Growth => 1,
            },
            ticker,
        ),
    }
}

/// Accounts in the order an initial buy should try them.
fn preferred_accounts<'a>(meta: Option<&AssetMeta>, accounts: &'a [Account]) -> Vec<&'a Account> {
    let sheltered_first =
        meta.is_some_and(|m| m.stabilizer || m.tax_efficiency.is_inefficient());
    let (first, second): (Vec<&Account>, Vec<&Account>) = accounts
        .iter()
        .partition(|a| a.is_tax_advantaged() == sheltered_first);
    first.into_iter().chain(second).collect()
}

fn placement(meta: Option<&AssetMeta>, kind: AccountKind) -> Placement {
    let Some(m) = meta else {
        return Placement::Unclassified;
    };
    let sheltered = kind == AccountKind::TaxAdvantaged;
    if m.stabilizer {
        Placement::Stabilizer { sheltered }
    } else if m.tax_efficiency.is_inefficient() {
        Placement::TaxInefficient {
            efficiency: m.tax_efficiency,
            sheltered,
        }
    } else if m.is_growth() || m.asset_type == crate::asset::AssetType::Stock {
        Placement::Growth {
            in_taxable: !sheltered,
        }
    } else {
        Placement::Sleeve(m.sleeve)
    }
}

fn allocate(
    total_value: f64,
    targets: &TargetWeights,
    asset_meta: &AssetBook,
    accounts: &[Account],
    cash: &AccountCash,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut remaining_cash: Vec<f64> = accounts
        .iter()
        .map(|a| cash.get(&a.id).copied().unwrap_or(0.0))
        .collect();
    let index_of = |id: &str| accounts.iter().position(|a| a.id == id);

    let mut order: Vec<Ticker> = targets.keys().copied().collect();
    order.sort_by_key(|t| priority(*t, asset_meta.get(t)));
    let mut unplaced: Vec<f64> = order
        .iter()
        .map(|t| targets.get(t).copied().unwrap_or(0.0) * total_value)
        .collect();

    // Preferred account, capped by its cash.
    for (i, &ticker) in order.iter().enumerate() {
        if unplaced[i] <= 0.0 {
            continue;
        }
        let meta = asset_meta.get(&ticker);
        let Some(account) = preferred_accounts(meta, accounts)
            .into_iter()
            .find(|a| index_of(&a.id).is_some_and(|j| remaining_cash[j] > 0.0))
        else {
            continue;
        };
        let Some(j) = index_of(&account.id) else {
            continue;
        };
        let value = unplaced[i].min(remaining_cash[j]);
        if value > MIN_TRADE {
            let reason = TradeReason::InitialPlacement(placement(meta, account.kind));
            trades.push(Trade::buy(&account.id, ticker, value, reason));
            remaining_cash[j] -= value;
            unplaced[i] -= value;
        }
    }

    // Sweep shortfalls into any account with cash left.
    for (i, &ticker) in order.iter().enumerate() {
        if unplaced[i] <= MIN_TRADE {
            continue;
        }
        for (j, account) in accounts.iter().enumerate() {
            if remaining_cash[j] <= 0.0 {
                continue;
            }
            let value = unplaced[i].min(remaining_cash[j]);
            if value > MIN_TRADE {
                log::debug!("init: {ticker} overflows into {}", account.id);
                trades.push(Trade::buy(
                    &account.id,
                    ticker,
                    value,
                    TradeReason::InitialOverflow(account.kind),
                ));
                remaining_cash[j] -= value;
                unplaced[i] -= value;
            }
            if unplaced[i] <= MIN_TRADE {
                break;
            }
        }
    }

    trades
}
