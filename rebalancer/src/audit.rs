//! JSONL audit trail logging.
//!
//! Each rebalancer run appends events to an audit.jsonl file, one JSON
//! object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sleevebook::strategy::StrategyEdit;
use sleevebook::{InitRecommendation, Recommendation, TargetWeights, Trade};

use crate::checks::CheckReport;
use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

fn trade_json(trades: &[Trade]) -> Vec<serde_json::Value> {
    trades
        .iter()
        .map(|t| {
            serde_json::json!({
                "account": t.account_id,
                "ticker": t.ticker.as_str(),
                "action": t.action.to_string(),
                "value": t.value,
                "reason": t.reason.to_string(),
            })
        })
        .collect()
}

pub fn log_run_started(audit: &mut AuditLog, command: &str, store_path: &Path) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "command": command,
            "targets_file": store_path.display().to_string(),
        }),
    )
}

pub fn log_recommendation(audit: &mut AuditLog, rec: &Recommendation) -> Result<()> {
    audit.log(
        "recommendation",
        serde_json::json!({
            "mode": rec.summary.mode.to_string(),
            "total_value": rec.summary.total_value,
            "stabilizer_weight": rec.summary.stabilizer_weight,
            "drifted": rec.summary.drifted.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            "warnings": rec.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "trades": trade_json(&rec.trades),
        }),
    )
}

pub fn log_init_allocation(audit: &mut AuditLog, rec: &InitRecommendation) -> Result<()> {
    audit.log(
        "init_allocation",
        serde_json::json!({
            "total_value": rec.summary.total_value,
            "account_cash": rec.summary.account_cash,
            "warnings": rec.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "trades": trade_json(&rec.trades),
        }),
    )
}

pub fn log_strategy_edit(audit: &mut AuditLog, command: &str, edit: &StrategyEdit) -> Result<()> {
    audit.log(
        "strategy_edit",
        serde_json::json!({
            "command": command,
            "message": edit.message,
            "new_asset": edit.new_meta.map(|m| m.ticker.as_str().to_string()),
        }),
    )
}

pub fn log_plan_checks(audit: &mut AuditLog, report: &CheckReport) -> Result<()> {
    let check_data: Vec<_> = report
        .checks
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "status": c.status.to_string(),
                "detail": c.detail,
            })
        })
        .collect();

    audit.log(
        "plan_checks",
        serde_json::json!({
            "passed": !report.has_failures(),
            "checks": check_data,
        }),
    )
}

pub fn log_targets_saved(
    audit: &mut AuditLog,
    overrides: &TargetWeights,
    store_path: &Path,
) -> Result<()> {
    audit.log(
        "targets_saved",
        serde_json::json!({
            "path": store_path.display().to_string(),
            "overrides": overrides,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleevebook::{Ticker, TradeReason};

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log.log_simple("test_event").unwrap();
            log.log("test_data", serde_json::json!({"key": "value"}))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }
        assert!(lines[0].contains("\"event\":\"test_event\""));
    }

    #[test]
    fn audit_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        AuditLog::open(&path).unwrap().log_simple("first").unwrap();
        AuditLog::open(&path).unwrap().log_simple("second").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deep").join("audit.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.log_simple("test").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn trades_are_flattened() {
        let trades = [Trade::sell(
            "401k",
            Ticker::new("VTI"),
            1500.0,
            TradeReason::RebalanceSell,
        )];
        let json = trade_json(&trades);
        assert_eq!(json[0]["account"], "401k");
        assert_eq!(json[0]["action"], "SELL");
        assert_eq!(json[0]["value"], 1500.0);
        assert_eq!(json[0]["reason"], "Rebalance sell (prefer tax-advantaged)");
    }
}
