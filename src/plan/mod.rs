//! Orchestrator: one end-to-end plan from stock, sizes, tier and mode.
//!
//! A plan is a pure function of its inputs, the tier table and the engine config.

use crate::allocator::{allocate, allocate_many};
use crate::config::EngineConfig;
use crate::damage::{formation_damage, DamageResult};
use crate::diagnostic::Diagnostic;
use crate::fraction::{FractionContext, Mode, Strategy};
use crate::model::{Formation, Fraction, Stockpile, UnitStats};
use crate::parser::{parse_triplet, to_pct_triplet};
use crate::recommend::{fill_ratio, recommend_march_count, Recommendation};
use crate::tiers::{BaseAttack, TierTable};
use crate::util::normalize_id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInputs {
    pub mode: Mode,
    pub tier_id: String,
    pub stock: Stockpile,
    /// Capacity of the call rally.
    pub rally_size: u32,
    /// Capacity of each join march.
    pub join_cap: u32,
    /// Join marches to build; also the upper bound of the recommendation scan.
    /// Clamped to `EngineConfig::max_join_formations`.
    pub join_count: u32,
    /// Only read by the closed-form strategy.
    #[serde(default)]
    pub stats: UnitStats,
    /// Free-form manual split ("50/30/20"); replaces the derived fraction when valid.
    #[serde(default)]
    pub manual_ratio: Option<String>,
    /// Build the recommended number of joins instead of `join_count`.
    #[serde(default)]
    pub use_recommended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FractionSource {
    Computed,
    Manual,
}

/// One scoreboard row. Windows repeat the same formations' scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowScore {
    pub window: u32,
    pub call: u64,
    pub joins: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockUsage {
    pub before: u64,
    pub used: u64,
    pub joins_formed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub mode: Mode,
    pub tier_id: String,
    pub base_attack: Option<BaseAttack>,
    pub fraction: Fraction,
    pub fraction_pct: String,
    pub fraction_source: FractionSource,
    pub call: Formation,
    pub joins: Vec<Formation>,
    pub leftover: Stockpile,
    pub recommendation: Option<Recommendation>,
    /// Recommended join count; the requested count when no scan was possible.
    pub recommended_joins: u32,
    pub call_damage: DamageResult,
    pub join_damage: Vec<DamageResult>,
    pub scoreboard: Vec<WindowScore>,
    pub usage: StockUsage,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run a full plan. Never fails; degraded inputs show up in `diagnostics`.
pub fn compute(inputs: &PlanInputs, tiers: &TierTable, cfg: &EngineConfig) -> PlanResult {
    let stock0 = inputs.stock;
    let tier_id = normalize_id(&inputs.tier_id);
    let mut diagnostics = Vec::new();

    let base_attack = tiers.base_attack(&tier_id);
    if base_attack.is_none() {
        diagnostics.push(Diagnostic::unknown_tier(&tier_id));
    }

    let join_count = inputs.join_count.min(cfg.max_join_formations);
    if join_count < inputs.join_count {
        tracing::warn!(
            "join count {} clamped to {}",
            inputs.join_count,
            cfg.max_join_formations
        );
        diagnostics.push(Diagnostic::join_count_clamped(
            inputs.join_count,
            cfg.max_join_formations,
        ));
    }

    let manual = match inputs.manual_ratio.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let parsed = parse_triplet(raw);
            if parsed.is_none() {
                diagnostics.push(Diagnostic::invalid_override(raw));
            }
            parsed
        }
        _ => None,
    };

    let (fraction, fraction_source) = match manual {
        Some(f) => (f, FractionSource::Manual),
        None => {
            let ctx = FractionContext {
                tier_id: &tier_id,
                tiers,
                config: cfg,
                stock: &stock0,
                rally_size: inputs.rally_size,
                join_cap: inputs.join_cap,
                join_count,
            };
            let out = Strategy::from_mode(inputs.mode, inputs.stats).derive_fraction(&ctx);
            if out.fell_back {
                diagnostics.push(Diagnostic::fraction_fallback());
            }
            (out.fraction, FractionSource::Computed)
        }
    };

    let (call, after_call) = allocate(&fraction, inputs.rally_size, stock0);

    let recommendation = recommend_march_count(
        &fraction,
        &after_call,
        join_count,
        inputs.join_cap,
        cfg.fill_threshold,
    );
    if join_count == 0 {
        diagnostics.push(Diagnostic::no_join_formations());
    }
    let recommended_joins = recommendation
        .map(|r| r.march_count)
        .unwrap_or(join_count);

    let built_joins = if inputs.use_recommended {
        recommended_joins
    } else {
        join_count
    };
    let (joins, leftover) = allocate_many(&fraction, inputs.join_cap, built_joins, after_call);

    let underfilled = std::iter::once((&call, inputs.rally_size))
        .chain(joins.iter().map(|j| (j, inputs.join_cap)))
        .filter(|(f, cap)| *cap > 0 && fill_ratio(f, *cap) < cfg.fill_threshold)
        .count();
    if underfilled > 0 {
        diagnostics.push(Diagnostic::stock_shortfall(underfilled, cfg.fill_threshold));
    }

    let call_damage = formation_damage(&call, &tier_id, tiers, cfg);
    let join_damage: Vec<DamageResult> = joins
        .iter()
        .map(|j| formation_damage(j, &tier_id, tiers, cfg))
        .collect();
    let scoreboard = scoreboard(&call_damage, &join_damage, cfg.windows);

    let joins_formed: u64 = joins.iter().map(Formation::total).sum();
    let usage = StockUsage {
        before: stock0.total(),
        used: call.total() + joins_formed,
        joins_formed,
    };

    tracing::debug!(
        "plan mode={} tier={} call={} joins={} leftover={} recommended={}",
        inputs.mode,
        tier_id,
        call.total(),
        joins.len(),
        leftover.total(),
        recommended_joins
    );

    PlanResult {
        mode: inputs.mode,
        tier_id,
        base_attack,
        fraction,
        fraction_pct: to_pct_triplet(&fraction),
        fraction_source,
        call,
        joins,
        leftover,
        recommendation,
        recommended_joins,
        call_damage,
        join_damage,
        scoreboard,
        usage,
        diagnostics,
    }
}

/// Same call and join scores repeated for each display window.
pub fn scoreboard(call: &DamageResult, joins: &[DamageResult], windows: u32) -> Vec<WindowScore> {
    let call_score = call.final_score;
    let join_score: u64 = joins.iter().map(|d| d.final_score).sum();
    (1..=windows)
        .map(|window| WindowScore {
            window,
            call: call_score,
            joins: join_score,
            total: call_score + join_score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StatPair, Troops};
    use crate::recommend::evaluate_set;

    fn tiers() -> TierTable {
        TierTable::from_json_str(
            r#"{"tiers":{"T6":{"inf":[243],"cav":[730],"arc":[974]},
                         "T10":{"inf":[472],"cav":[1416],"arc":[1889]}}}"#,
        )
        .unwrap()
    }

    fn inputs(mode: Mode) -> PlanInputs {
        PlanInputs {
            mode,
            tier_id: "T10".to_string(),
            stock: Troops::new(12_000, 18_000, 95_000),
            rally_size: 15_000,
            join_cap: 9_000,
            join_count: 8,
            stats: UnitStats {
                inf: StatPair { attack: 250.0, lethality: 180.0 },
                cav: StatPair { attack: 240.0, lethality: 170.0 },
                arc: StatPair { attack: 300.0, lethality: 220.0 },
            },
            manual_ratio: None,
            use_recommended: false,
        }
    }

    fn assert_conserved(r: &PlanResult, stock: &Stockpile) {
        let used = r.joins.iter().fold(r.call, |acc, j| acc + *j);
        assert_eq!(used + r.leftover, *stock);
        assert_eq!(r.usage.used + r.leftover.total(), r.usage.before);
    }

    #[test]
    fn every_mode_conserves_stock_and_caps() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        for mode in [Mode::Ratio, Mode::Balanced, Mode::Magic] {
            let inp = inputs(mode);
            let r = compute(&inp, &tiers, &cfg);
            assert_conserved(&r, &inp.stock);
            assert!(r.call.total() <= inp.rally_size as u64);
            assert!(r.joins.iter().all(|j| j.total() <= inp.join_cap as u64));
            assert_eq!(r.joins.len(), 8);
            assert!(r.fraction.is_valid());
            assert_eq!(r.scoreboard.len(), 5);
        }
    }

    #[test]
    fn neutral_manual_split_scenario() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let inp = PlanInputs {
            mode: Mode::Ratio,
            tier_id: "T6".to_string(),
            stock: Troops::new(1000, 1000, 1000),
            rally_size: 300,
            join_cap: 200,
            join_count: 3,
            stats: UnitStats::default(),
            manual_ratio: Some("1/1/1".to_string()),
            use_recommended: false,
        };
        let r = compute(&inp, &tiers, &cfg);
        assert_eq!(r.fraction_source, FractionSource::Manual);
        assert_eq!(r.call, Troops::new(100, 100, 100));
        assert!(r.joins.iter().all(|j| j.total() == 200));
        assert_eq!(r.usage.used, 900);
        assert_eq!(r.leftover.total(), 2100);
        assert_conserved(&r, &inp.stock);
    }

    #[test]
    fn manual_override_bypasses_strategy() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let mut inp = inputs(Mode::Magic);
        inp.manual_ratio = Some("50/30/20".to_string());
        let r = compute(&inp, &tiers, &cfg);
        assert_eq!(r.fraction_source, FractionSource::Manual);
        assert!((r.fraction.inf - 0.5).abs() < 1e-12);
        assert!((r.fraction.cav - 0.3).abs() < 1e-12);
        assert!((r.fraction.arc - 0.2).abs() < 1e-12);
        assert_eq!(r.call, Troops::new(7_500, 4_500, 3_000));
        assert_eq!(r.fraction_pct, "50/30/20");
    }

    #[test]
    fn invalid_override_is_ignored() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let mut inp = inputs(Mode::Ratio);
        inp.manual_ratio = Some("-5/abc".to_string());
        let r = compute(&inp, &tiers, &cfg);
        assert_eq!(r.fraction_source, FractionSource::Computed);
        assert!(r.diagnostics.iter().any(|d| d.code == "INVALID_OVERRIDE"));
    }

    #[test]
    fn unknown_tier_scores_zero() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let mut inp = inputs(Mode::Balanced);
        inp.tier_id = "T99".to_string();
        let r = compute(&inp, &tiers, &cfg);
        assert_eq!(r.call_damage.final_score, 0);
        assert!(r.join_damage.iter().all(|d| d.final_score == 0));
        assert!(r.scoreboard.iter().all(|w| w.total == 0));
        assert!(r.diagnostics.iter().any(|d| d.code == "UNKNOWN_TIER"));
    }

    #[test]
    fn zero_stock_builds_empty_formations() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let mut inp = inputs(Mode::Ratio);
        inp.stock = Troops::default();
        let r = compute(&inp, &tiers, &cfg);
        assert_eq!(r.call.total(), 0);
        assert!(r.joins.iter().all(|j| j.total() == 0));
        assert_eq!(r.leftover, Troops::default());
    }

    #[test]
    fn zero_joins_recommends_requested_count() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let mut inp = inputs(Mode::Ratio);
        inp.join_count = 0;
        let r = compute(&inp, &tiers, &cfg);
        assert!(r.recommendation.is_none());
        assert_eq!(r.recommended_joins, 0);
        assert!(r.joins.is_empty());
        assert!(r.diagnostics.iter().any(|d| d.code == "NO_JOIN_FORMATIONS"));
    }

    #[test]
    fn huge_join_count_is_clamped() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let mut inp = inputs(Mode::Ratio);
        inp.stock = Troops::new(10, 10, 10);
        inp.join_cap = 10;
        inp.join_count = u32::MAX;
        let r = compute(&inp, &tiers, &cfg);
        assert_eq!(r.joins.len() as u32, cfg.max_join_formations);
        assert!(r.recommended_joins <= cfg.max_join_formations);
        assert!(r.diagnostics.iter().any(|d| d.code == "JOIN_COUNT_CLAMPED"));
        assert_conserved(&r, &inp.stock);
    }

    #[test]
    fn use_recommended_builds_winning_count() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        for mode in [Mode::Ratio, Mode::Magic] {
            let mut inp = inputs(mode);
            inp.join_count = 20;
            inp.use_recommended = true;
            let r = compute(&inp, &tiers, &cfg);
            let rec = r.recommendation.unwrap();
            assert!(rec.march_count < 20);
            assert_eq!(r.joins.len() as u32, rec.march_count);
            assert_eq!(r.recommended_joins, rec.march_count);
            assert_eq!(evaluate_set(&r.joins, inp.join_cap, cfg.fill_threshold), rec.metrics);
            assert_eq!(r.leftover.total(), rec.leftover);
            assert_conserved(&r, &inp.stock);
        }
    }

    #[test]
    fn recommendation_scans_stock_left_after_call() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        // Call takes 300 of each type, leaving 100/100/100: two 150-troop joins.
        let inp = PlanInputs {
            mode: Mode::Ratio,
            tier_id: "T6".to_string(),
            stock: Troops::new(400, 400, 400),
            rally_size: 900,
            join_cap: 150,
            join_count: 4,
            stats: UnitStats::default(),
            manual_ratio: Some("1/1/1".to_string()),
            use_recommended: false,
        };
        let r = compute(&inp, &tiers, &cfg);
        let (_, after_call) = allocate(&r.fraction, inp.rally_size, inp.stock);
        assert_eq!(after_call, Troops::new(100, 100, 100));

        let rec = r.recommendation.unwrap();
        let expected =
            recommend_march_count(&r.fraction, &after_call, 4, 150, cfg.fill_threshold).unwrap();
        assert_eq!(rec, expected);
        assert_eq!(rec.march_count, 2);
        assert_eq!(rec.leftover, 0);
        assert_eq!(rec.metrics.full_count, 2);

        let pre_call =
            recommend_march_count(&r.fraction, &inp.stock, 4, 150, cfg.fill_threshold).unwrap();
        assert_ne!(rec, pre_call);
        assert_eq!(pre_call.march_count, 4);
    }

    #[test]
    fn known_tier_carries_base_attack() {
        let tiers = tiers();
        let r = compute(&inputs(Mode::Ratio), &tiers, &EngineConfig::default());
        let b = r.base_attack.unwrap();
        assert_eq!((b.inf, b.cav, b.arc), (472.0, 1416.0, 1889.0));
    }

    #[test]
    fn recompute_is_identical() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let inp = inputs(Mode::Magic);
        assert_eq!(compute(&inp, &tiers, &cfg), compute(&inp, &tiers, &cfg));
    }

    #[test]
    fn scoreboard_repeats_scores() {
        let tiers = tiers();
        let cfg = EngineConfig::default();
        let r = compute(&inputs(Mode::Ratio), &tiers, &cfg);
        let joins: u64 = r.join_damage.iter().map(|d| d.final_score).sum();
        for (i, w) in r.scoreboard.iter().enumerate() {
            assert_eq!(w.window, i as u32 + 1);
            assert_eq!(w.call, r.call_damage.final_score);
            assert_eq!(w.joins, joins);
            assert_eq!(w.total, w.call + w.joins);
        }
    }
}
