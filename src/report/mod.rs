//! Text and JSON output for a computed plan.

use crate::model::Formation;
use crate::plan::PlanResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    plan: &'a PlanResult,
}

pub fn write_json_report(plan: &PlanResult, path: &Path) -> Result<(), String> {
    let report = JsonReport {
        generated_at: Utc::now(),
        plan,
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn plan_to_json(plan: &PlanResult) -> Result<String, String> {
    serde_json::to_string_pretty(plan).map_err(|e| e.to_string())
}

fn formation_row(out: &mut String, label: &str, f: &Formation) {
    let _ = writeln!(
        out,
        "{:<6} {:>8} {:>8} {:>8} {:>8}",
        label,
        f.inf,
        f.cav,
        f.arc,
        f.total()
    );
}

/// Human-readable plan: formations, fraction, inventory, recommendation, scoreboard.
pub fn render_text(plan: &PlanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mode: {}  Tier: {}", plan.mode, plan.tier_id);
    match &plan.base_attack {
        Some(b) => {
            let _ = writeln!(
                out,
                "Using tier {}: Base ATK {}/{}/{}",
                plan.tier_id, b.inf, b.cav, b.arc
            );
        }
        None => {
            let _ = writeln!(out, "Tier {}: no data loaded", plan.tier_id);
        }
    }
    let _ = writeln!(
        out,
        "Using: {} (Inf/Cav/Arc, {})",
        plan.fraction_pct,
        match plan.fraction_source {
            crate::plan::FractionSource::Computed => "computed",
            crate::plan::FractionSource::Manual => "manual",
        }
    );

    let _ = writeln!(out, "\n{:<6} {:>8} {:>8} {:>8} {:>8}", "Type", "Inf", "Cav", "Arc", "Total");
    formation_row(&mut out, "CALL", &plan.call);
    for (i, j) in plan.joins.iter().enumerate() {
        formation_row(&mut out, &format!("#{}", i + 1), j);
    }

    let l = &plan.leftover;
    let _ = writeln!(
        out,
        "\nRally {} used -> INF {}, CAV {}, ARC {}.",
        plan.call.total(),
        plan.call.inf,
        plan.call.cav,
        plan.call.arc
    );
    let cap = plan.joins.iter().map(Formation::total).max().unwrap_or(0);
    let _ = writeln!(
        out,
        "Formations built: {} (largest {}) -> {} troops.",
        plan.joins.len(),
        cap,
        plan.usage.joins_formed
    );
    let _ = writeln!(out, "Leftover -> INF {}, CAV {}, ARC {}.", l.inf, l.cav, l.arc);
    let _ = writeln!(out, "Stock used: {} / {}.", plan.usage.used, plan.usage.before);

    match &plan.recommendation {
        Some(r) => {
            let _ = writeln!(
                out,
                "\nBest: {} marches (min {:.1}%, avg {:.1}%)",
                r.march_count,
                r.metrics.min_fill * 100.0,
                r.metrics.avg_fill * 100.0
            );
        }
        None => {
            let _ = writeln!(out, "\nBest: {} marches", plan.recommended_joins);
        }
    }

    let _ = writeln!(out, "\n{:<6} {:>10} {:>10} {:>10}", "Window", "Call", "Joins", "Total");
    for w in &plan.scoreboard {
        let _ = writeln!(out, "{:<6} {:>10} {:>10} {:>10}", w.window, w.call, w.joins, w.total);
    }

    if !plan.diagnostics.is_empty() {
        let _ = writeln!(out, "\nDiagnostics:");
        for d in &plan.diagnostics {
            let _ = writeln!(out, "  [{}] {} - {}", d.code, d.label(), d.summary);
        }
    }
    out
}
