//! Plain-text rendering of recommendations for the terminal.

use std::fmt::Write;

use sleevebook::strategy::GrowthSleeve;
use sleevebook::{Dollars, InitRecommendation, Pct, Recommendation, Trade};

const RULE: &str = "==================================================";

fn trade_lines(out: &mut String, trades: &[Trade], explain: bool) {
    for t in trades {
        let line = if explain { t.explain() } else { t.to_string() };
        let _ = writeln!(out, "  {line}");
    }
}

fn warning_lines<W: std::fmt::Display>(out: &mut String, warnings: &[W]) {
    if warnings.is_empty() {
        return;
    }
    out.push_str("\nWarnings:\n");
    for w in warnings {
        let _ = writeln!(out, "  - {w}");
    }
}

pub fn recommendation(rec: &Recommendation, explain: bool) -> String {
    let s = &rec.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Rebalance Recommendation (mode: {})", s.mode);
    let _ = writeln!(out, "{RULE}");

    out.push_str("\nSummary:\n");
    let _ = writeln!(out, "  total_value: {}", Dollars(s.total_value));
    let _ = writeln!(out, "  stabilizer_weight: {}", Pct(s.stabilizer_weight));
    let drifted: Vec<&str> = s.drifted.iter().map(|t| t.as_str()).collect();
    let _ = writeln!(out, "  drifted: [{}]", drifted.join(", "));
    let _ = writeln!(out, "  num_trades: {}", s.num_trades);

    warning_lines(&mut out, &rec.warnings);

    if rec.trades.is_empty() {
        out.push_str("\nNo trades recommended (within drift bands).\n");
    } else {
        out.push_str("\nTrades:\n");
        trade_lines(&mut out, &rec.trades, explain);
        let (bought, sold) = rec.turnover();
        let _ = writeln!(
            out,
            "\n  Bought {}, sold {}",
            Dollars(bought),
            Dollars(sold)
        );
    }
    out
}

pub fn init_allocation(rec: &InitRecommendation, explain: bool) -> String {
    let s = &rec.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Initial Portfolio Allocation: {}", Dollars(s.total_value));
    let _ = writeln!(out, "{RULE}");

    out.push_str("\nAccount Cash Distribution:\n");
    for (id, cash) in &s.account_cash {
        let _ = writeln!(out, "  {id}: {}", Dollars(*cash));
    }

    out.push_str("\nSummary:\n");
    let _ = writeln!(out, "  total_value: {}", Dollars(s.total_value));
    let _ = writeln!(out, "  num_trades: {}", s.num_trades);
    out.push_str("  allocated_by_account:\n");
    for (id, v) in &s.allocated_by_account {
        let _ = writeln!(out, "    {id}: {}", Dollars(*v));
    }
    out.push_str("  allocated_by_ticker:\n");
    for (ticker, v) in &s.allocated_by_ticker {
        let _ = writeln!(out, "    {ticker}: {}", Dollars(*v));
    }

    warning_lines(&mut out, &rec.warnings);

    if rec.trades.is_empty() {
        out.push_str("\nNo trades generated.\n");
    } else {
        out.push_str("\nTrades:\n");
        trade_lines(&mut out, &rec.trades, explain);
    }
    out
}

pub fn growth_sleeve(sleeve: &GrowthSleeve) -> String {
    let mut out = String::new();
    out.push_str("Growth Sleeve Composition:\n");
    out.push_str("========================================\n");
    for e in &sleeve.entries {
        let _ = writeln!(
            out,
            "  {:8} {:>7}  ({})",
            e.ticker,
            Pct(e.weight).to_string(),
            e.asset_type
        );
    }
    out.push_str("----------------------------------------\n");
    let _ = writeln!(out, "  {:8} {:>7}", "Total", Pct(sleeve.total).to_string());
    let _ = writeln!(out, "\n  Growth cap: {}", Pct(sleeve.cap));
    let _ = writeln!(out, "  Remaining:  {}", Pct(sleeve.headroom()));
    out
}
