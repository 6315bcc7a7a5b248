//! Command workflows: load → plan → check → confirm → persist.
//!
//! Each command opens the audit trail, works from the merged targets
//! (universe base plus stored overrides), prints its result and returns it.

use log::{info, warn};
use sleevebook::init::AccountCash;
use sleevebook::strategy::{
    AddAsset, GrowthSleeve, StrategyEdit, StrategyEngine, load_targets, target_overrides,
};
use sleevebook::{
    AssetBook, InitRecommendation, Pct, RebalanceMode, Recommendation, TargetWeights, Ticker,
    check_target_sum, compute_init_allocation, recommend, suggested_cash_split,
};

use crate::audit::{self, AuditLog};
use crate::checks;
use crate::config::{AssetEntry, Config};
use crate::error::{Error, Result};
use crate::reconcile;
use crate::render;
use crate::store::FileTargetStore;

/// Targets are expected to sum to 1.0 within this before a rebalance.
const TARGET_SUM_TOLERANCE: f64 = 1e-6;

/// Output and persistence switches shared by all commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print JSON instead of text (init, rebalance).
    pub json: bool,
    /// Append the reason to each trade line.
    pub explain: bool,
    /// Show the edit without saving (strategy edits).
    pub dry_run: bool,
    /// Skip the confirmation prompt (strategy edits).
    pub force: bool,
}

/// A growth-sleeve edit requested on the command line.
#[derive(Debug, Clone, Copy)]
pub enum StrategyCommand {
    Add(AddAsset),
    Remove(Ticker),
    Rotate { from: Ticker, to: Ticker, weight: f64 },
}

impl StrategyCommand {
    fn name(&self) -> &'static str {
        match self {
            StrategyCommand::Add(_) => "add",
            StrategyCommand::Remove(_) => "remove",
            StrategyCommand::Rotate { .. } => "rotate",
        }
    }
}

/// Base targets merged with the stored overrides, and the universe metadata
/// extended with metadata recorded for added tickers.
pub fn current_targets(config: &Config, store: &FileTargetStore) -> Result<(TargetWeights, AssetBook)> {
    let targets = load_targets(store, config.base_targets())?;
    let mut book = config.asset_book();
    for (ticker, meta) in store.load_assets()? {
        book.entry(ticker).or_insert(meta);
    }
    Ok((targets, book))
}

/// Parse `id=amount` pairs from `--account-cash`.
pub fn parse_account_cash(items: &[String]) -> Result<AccountCash> {
    let mut cash = AccountCash::new();
    for item in items {
        let parsed = item
            .split_once('=')
            .and_then(|(id, amount)| Some((id.trim(), amount.trim().parse::<f64>().ok()?)));
        match parsed {
            Some((id, amount)) if !id.is_empty() && amount.is_finite() && amount >= 0.0 => {
                cash.insert(id.to_string(), amount);
            }
            _ => {
                return Err(Error::Config(format!(
                    "invalid --account-cash {item:?}: expected account_id=amount (e.g. 401k=1000000)"
                )));
            }
        }
    }
    Ok(cash)
}

/// Plan the initial funding of empty accounts.
///
/// Without `account_cash`, the total is split by the asset-location
/// heuristic of [`suggested_cash_split`].
pub fn run_init(
    config: &Config,
    store: &FileTargetStore,
    total: f64,
    account_cash: Option<AccountCash>,
    opts: &RunOptions,
) -> Result<InitRecommendation> {
    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(&mut audit, "init", store.path())?;

    let (targets, book) = current_targets(config, store)?;
    let accounts = config.empty_accounts();
    let cash = match account_cash {
        Some(cash) => cash,
        None => {
            info!("No --account-cash given, using suggested split");
            suggested_cash_split(total, &targets, &book, &accounts, &config.policy)
        }
    };

    let rec = compute_init_allocation(total, &targets, &book, &accounts, Some(&cash), &config.policy)?;
    audit::log_init_allocation(&mut audit, &rec)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&rec)?);
    } else {
        print!("{}", render::init_allocation(&rec, opts.explain));
    }
    Ok(rec)
}

/// Recommend rebalancing trades for the configured accounts.
///
/// Fails with [`Error::ChecksFailed`] after printing if any plan check
/// fails.
pub fn run_rebalance(
    config: &Config,
    store: &FileTargetStore,
    mode: RebalanceMode,
    opts: &RunOptions,
) -> Result<Recommendation> {
    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(&mut audit, "rebalance", store.path())?;

    let (targets, book) = current_targets(config, store)?;
    if let Err(e) = check_target_sum(&targets, TARGET_SUM_TOLERANCE) {
        warn!("{e}; drift is measured against the targets as given");
    }
    let portfolio = config.portfolio(book, targets);

    info!("Planning {mode} rebalance");
    let rec = recommend(&portfolio, &config.policy, mode);
    audit::log_recommendation(&mut audit, &rec)?;

    let report = checks::check_plan(
        &rec.trades,
        &portfolio,
        &config.checks,
        config.policy.rebalance.max_trades,
    );
    audit::log_plan_checks(&mut audit, &report)?;
    let projected = reconcile::reconcile(&portfolio, &rec.trades);

    if opts.json {
        let out = serde_json::json!({
            "recommendation": serde_json::to_value(&rec)?,
            "checks": serde_json::to_value(&report)?,
            "reconciliation": serde_json::to_value(&projected)?,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render::recommendation(&rec, opts.explain));
        print!("\n{report}");
        if !rec.trades.is_empty() {
            print!("\n{projected}");
        }
    }

    if report.has_failures() {
        return Err(Error::ChecksFailed(
            "one or more plan checks failed; review the trades before acting".into(),
        ));
    }
    Ok(rec)
}

/// Current growth-sleeve composition.
pub fn strategy_show(config: &Config, store: &FileTargetStore) -> Result<GrowthSleeve> {
    let (targets, book) = current_targets(config, store)?;
    let sleeve = StrategyEngine::new(&targets, &book, &config.policy).growth_sleeve();
    print!("{}", render::growth_sleeve(&sleeve));
    Ok(sleeve)
}

/// Validate a growth-sleeve edit, confirm it, and save the new overrides.
///
/// A rejected edit returns [`Error::Strategy`] with nothing written. With
/// `dry_run` the edit is returned unsaved. A declined prompt is
/// [`Error::Aborted`]; a prompt that cannot be shown is [`Error::Prompt`].
/// Targets and metadata for a new ticker are written in one store update.
pub fn run_strategy(
    config: &Config,
    store: &mut FileTargetStore,
    command: &StrategyCommand,
    opts: &RunOptions,
) -> Result<StrategyEdit> {
    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(&mut audit, command.name(), store.path())?;

    let (targets, mut book) = current_targets(config, store)?;
    let engine = StrategyEngine::new(&targets, &book, &config.policy);
    let edit = match *command {
        StrategyCommand::Add(ref req) => engine.add_asset(req)?,
        StrategyCommand::Remove(ticker) => engine.remove_asset(ticker)?,
        StrategyCommand::Rotate { from, to, weight } => engine.rotate(from, to, weight)?,
    };
    audit::log_strategy_edit(&mut audit, command.name(), &edit)?;
    println!("{}", edit.message);

    if let Some(meta) = edit.new_meta {
        book.insert(meta.ticker, meta);
    }
    let after = StrategyEngine::new(&edit.targets, &book, &config.policy).growth_sleeve();
    println!(
        "Growth sleeve now {} of {} cap",
        Pct(after.total),
        Pct(after.cap)
    );
    let sum: f64 = edit.targets.values().sum();
    if (sum - 1.0).abs() > TARGET_SUM_TOLERANCE {
        println!(
            "Note: targets now sum to {}; rotate or remove to bring them back to 100%",
            Pct(sum)
        );
    }

    if opts.dry_run {
        println!("\n[DRY RUN] Targets not saved.");
        return Ok(edit);
    }

    if !opts.force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Save updated targets?")
            .default(false)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))?;

        if !confirmed {
            audit.log("user_confirmed", serde_json::json!({"approved": false}))?;
            return Err(Error::Aborted("targets not saved".into()));
        }

        audit.log("user_confirmed", serde_json::json!({"approved": true}))?;
    }

    let written = target_overrides(config.base_targets(), &edit.targets);
    let asset = edit.new_meta.map(|meta| (meta.ticker, AssetEntry::from(&meta)));
    store.save_edit(&written, asset)?;
    audit::log_targets_saved(&mut audit, &written, store.path())?;
    println!("\nUpdated targets saved to {}", store.path().display());
    Ok(edit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_cash_pairs() {
        let items = vec!["401k=300000".to_string(), " brokerage = 700000 ".to_string()];
        let cash = parse_account_cash(&items).unwrap();
        assert_eq!(cash["401k"], 300_000.0);
        assert_eq!(cash["brokerage"], 700_000.0);
    }

    #[test]
    fn account_cash_rejects_garbage() {
        for bad in ["401k", "=5", "401k=lots", "401k=-1"] {
            assert!(
                matches!(parse_account_cash(&[bad.to_string()]), Err(Error::Config(_))),
                "{bad} should be rejected"
            );
        }
    }
}
