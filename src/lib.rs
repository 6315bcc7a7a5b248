//! # sleevebook
//!
//! Policy-driven allocation and rebalancing for a multi-account portfolio
//! split into a *core* sleeve and a capped *growth* sleeve.
//!
//! ## Features
//!
//! - **Drift detection**: absolute and relative bands around each target weight
//! - **Asset location**: buys routed to taxable or tax-advantaged accounts by
//!   tax efficiency; sells drawn from tax-advantaged accounts first
//! - **Hard limits**: leveraged ETFs, single-stock concentration and the
//!   growth-sleeve cap are enforced by forced sells in conservative mode
//! - **Initial allocation**: a lump sum placed across accounts in two passes
//! - **Growth-sleeve editing**: add, remove and rotate positions with full
//!   validation before anything changes
//!
//! Every function here is a pure computation over in-memory values. Nothing
//! is executed and nothing is read from disk.
//!
//! ## Quick Start
//!
//! ```
//! use sleevebook::{Account, AccountKind, Action, Portfolio, RebalanceMode, TargetWeights, Ticker, recommend};
//! # use sleevebook::policy::*;
//! # let policy = Policy {
//! #     sleeves: AllocationPolicy { core_min: 0.65, growth_max: 0.30 },
//! #     stabilizer: RiskPolicy { min_pct_total: 0.15, stabilizer_tickers: vec![Ticker::new("BND")] },
//! #     growth: GrowthPolicy {
//! #         max_single_stock_weight: 0.10,
//! #         prohibit_leveraged: true,
//! #         exclusive_groups: growth::default_exclusive_groups(),
//! #     },
//! #     rebalance: RebalancePolicy { drift_absolute: 0.05, drift_relative: 0.20, max_trades: 50 },
//! #     taxable: TaxPolicy { buy_first_sell_last: true, avoid_short_term_days: 365 },
//! # };
//!
//! let (vti, bnd) = (Ticker::new("VTI"), Ticker::new("BND"));
//! let ira = Account::new("ira", AccountKind::TaxAdvantaged)
//!     .with_holding(vti, 70_000.0)
//!     .with_holding(bnd, 10_000.0);
//! let brokerage = Account::new("brokerage", AccountKind::Taxable).with_holding(vti, 20_000.0);
//! let targets = TargetWeights::from([(vti, 0.80), (bnd, 0.20)]);
//! let portfolio = Portfolio::new(vec![ira, brokerage], Default::default(), targets);
//!
//! let rec = recommend(&portfolio, &policy, RebalanceMode::Strict);
//!
//! // Bonds are 10pp under target: sell $10k VTI in the IRA, buy $10k BND.
//! assert_eq!(rec.summary.drifted, vec![bnd, vti]);
//! assert_eq!(rec.trades.len(), 2);
//! assert!(rec.trades.iter().all(|t| t.account_id == "ira"));
//! assert_eq!(rec.trades[0].action, Action::Buy);
//! ```
//!
//! ## Rebalance Modes
//!
//! | Mode | Drift sells | Drift buys | Constraint sells |
//! |------|-------------|------------|------------------|
//! | **strict** | yes | yes | no |
//! | **conservative** | no | yes | yes, placed first |
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for the policy, account and
//!   recommendation types
//! - `parallel`: [`batch`] recommendations over many portfolios with rayon

mod account;
mod action;
mod asset;
#[cfg(feature = "parallel")]
pub mod batch;
pub mod drift;
mod error;
pub mod init;
pub mod planner;
pub mod policy;
pub mod portfolio;
pub mod rebalance;
pub mod resolver;
pub mod strategy;
mod trade;
mod types;

// Re-export public API
pub use account::{Account, AccountKind};
pub use action::Action;
pub use asset::{AssetMeta, AssetType, Sleeve, TaxEfficiency};
pub use drift::{DriftResult, compute_drift};
pub use error::{PlanError, StrategyError};
pub use init::{
    AccountCash, InitRecommendation, InitSummary, compute_init_allocation, suggested_cash_split,
};
pub use planner::{plan_trades, select_best_account};
pub use policy::{Policy, Warning};
pub use portfolio::{AssetBook, Portfolio, TargetWeights, check_target_sum};
pub use rebalance::{RebalanceMode, RebalanceSummary, Recommendation, recommend};
pub use resolver::constraint_violation_sells;
pub use strategy::{AddAsset, GrowthSleeve, StrategyEdit, StrategyEngine};
pub use trade::{Placement, Trade, TradeReason};
pub use types::{Dollars, MAX_TICKER_LEN, Pct, Ticker};
