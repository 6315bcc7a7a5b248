//! Portfolio model: accounts, asset metadata and target weights.
//!
//! All derived values (total value, per-ticker values and weights) are
//! computed on demand from the account snapshot and never cached.
//!
//! # Example
//!
//! ```
//! use sleevebook::{Account, AccountKind, Portfolio, Ticker, TargetWeights};
//!
//! let vti = Ticker::new("VTI");
//! let bnd = Ticker::new("BND");
//! let ira = Account::new("ira", AccountKind::TaxAdvantaged)
//!     .with_holding(vti, 80.0)
//!     .with_holding(bnd, 20.0);
//! let targets = TargetWeights::from([(vti, 0.7), (bnd, 0.3)]);
//!
//! let portfolio = Portfolio::new(vec![ira], Default::default(), targets);
//! assert_eq!(portfolio.total_value(), 100.0);
//! assert!((portfolio.weight_of(&bnd) - 0.2).abs() < 1e-12);
//! ```

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::account::Account;
use crate::action::Action;
use crate::asset::AssetMeta;
use crate::error::PlanError;
use crate::trade::Trade;
use crate::types::Ticker;

/// Target weight per ticker. Iteration is in ticker order.
pub type TargetWeights = BTreeMap<Ticker, f64>;

/// Asset metadata indexed by ticker.
pub type AssetBook = FxHashMap<Ticker, AssetMeta>;

/// Accounts plus the metadata and targets they are managed against.
#[derive(Clone, Debug)]
pub struct Portfolio {
    accounts: Vec<Account>,
    asset_meta: AssetBook,
    targets: TargetWeights,
}

impl Portfolio {
    pub fn new(accounts: Vec<Account>, asset_meta: AssetBook, targets: TargetWeights) -> Self {
        Self {
            accounts,
            asset_meta,
            targets,
        }
    }

    // === Queries ===

    /// Accounts in configured order.
    #[inline]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    #[inline]
    pub fn asset_meta(&self) -> &AssetBook {
        &self.asset_meta
    }

    #[inline]
    pub fn meta(&self, ticker: &Ticker) -> Option<&AssetMeta> {
        self.asset_meta.get(ticker)
    }

    #[inline]
    pub fn targets(&self) -> &TargetWeights {
        &self.targets
    }

    /// Sum of all account values (cash included).
    pub fn total_value(&self) -> f64 {
        self.accounts.iter().map(Account::total_value).sum()
    }

    /// Dollar value held per ticker, summed across accounts.
    pub fn current_values(&self) -> BTreeMap<Ticker, f64> {
        let mut values = BTreeMap::new();
        for account in &self.accounts {
            for (&ticker, &value) in &account.holdings {
                *values.entry(ticker).or_insert(0.0) += value;
            }
        }
        values
    }

    /// Dollar value held of one ticker across all accounts.
    pub fn current_value(&self, ticker: &Ticker) -> f64 {
        self.accounts.iter().map(|a| a.holding(ticker)).sum()
    }

    /// Current weight of one ticker (0 when the portfolio is empty).
    pub fn weight_of(&self, ticker: &Ticker) -> f64 {
        let total = self.total_value();
        if total <= 0.0 {
            return 0.0;
        }
        self.current_value(ticker) / total
    }

    /// Current weight of every *target* ticker.
    ///
    /// Tickers that are held but not targeted are omitted; use
    /// [`Portfolio::exposure_weights`] to see them.
    pub fn current_weights(&self) -> BTreeMap<Ticker, f64> {
        let total = self.total_value();
        let values = self.current_values();
        self.targets
            .keys()
            .map(|t| {
                let w = if total > 0.0 {
                    values.get(t).copied().unwrap_or(0.0) / total
                } else {
                    0.0
                };
                (*t, w)
            })
            .collect()
    }

    /// Current weight of every ticker that is either held or targeted.
    pub fn exposure_weights(&self) -> BTreeMap<Ticker, f64> {
        let total = self.total_value();
        let mut values = self.current_values();
        for t in self.targets.keys() {
            values.entry(*t).or_insert(0.0);
        }
        if total > 0.0 {
            for v in values.values_mut() {
                *v /= total;
            }
        } else {
            for v in values.values_mut() {
                *v = 0.0;
            }
        }
        values
    }

    // === Projection ===

    /// The portfolio as it would look after executing `trades`.
    ///
    /// BUYs debit the account's cash and credit the holding; SELLs do the
    /// reverse. Trades for unknown accounts are ignored. Holdings that reach
    /// zero are dropped. `self` is left untouched.
    pub fn with_trades_applied(&self, trades: &[Trade]) -> Portfolio {
        let mut projected = self.clone();
        for trade in trades {
            let Some(account) = projected
                .accounts
                .iter_mut()
                .find(|a| a.id == trade.account_id)
            else {
                continue;
            };
            let signed = trade.action.sign() * trade.value;
            let holding = account.holdings.entry(trade.ticker).or_insert(0.0);
            *holding += signed;
            if trade.action == Action::Sell && *holding <= 1e-9 {
                account.holdings.remove(&trade.ticker);
            }
            account.cash -= signed;
        }
        projected
    }
}

/// Check that target weights sum to 1.0 within `tolerance`.
pub fn check_target_sum(targets: &TargetWeights, tolerance: f64) -> Result<(), PlanError> {
    let sum: f64 = targets.values().sum();
    if (sum - 1.0).abs() > tolerance {
        return Err(PlanError::TargetSum { sum, tolerance });
    }
    Ok(())
}
