//! Damage model: simulated score of one formation against the bear.

use crate::config::EngineConfig;
use crate::model::Formation;
use crate::tiers::{BaseAttack, TierTable};
use serde::Serialize;

/// Per-type damage contribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeDamage {
    pub inf: f64,
    pub cav: f64,
    pub arc: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DamageResult {
    pub by_type: TypeDamage,
    /// Aggregate over ten rounds, before rounding.
    pub round10_total: f64,
    pub final_score: u64,
}

/// Per-troop damage coefficient per unit type: attack / defense-per-troop / 100 × skill.
pub fn damage_coefficients(base: &BaseAttack, cfg: &EngineConfig) -> TypeDamage {
    let dpt = cfg.defense_per_troop();
    let coef = |atk: f64, skill: f64| {
        if dpt > 0.0 {
            cfg.per_troop_attack(atk) / dpt / 100.0 * skill
        } else {
            0.0
        }
    };
    TypeDamage {
        inf: coef(base.inf, cfg.skill.inf),
        cav: coef(base.cav, cfg.skill.cav),
        arc: coef(base.arc, cfg.skill.arc),
    }
}

/// Score a formation for a tier. Unknown tier or empty formation yields all zeros.
pub fn formation_damage(
    formation: &Formation,
    tier_id: &str,
    tiers: &TierTable,
    cfg: &EngineConfig,
) -> DamageResult {
    let Some(base) = tiers.base_attack(tier_id) else {
        return DamageResult::default();
    };
    let total = formation.total() as f64;
    if total <= 0.0 {
        return DamageResult::default();
    }
    let army_min = total.min(cfg.target.troops);
    let k = damage_coefficients(&base, cfg);
    let by_type = TypeDamage {
        inf: army_factor(formation.inf, army_min) * k.inf,
        cav: army_factor(formation.cav, army_min) * k.cav,
        arc: army_factor(formation.arc, army_min) * k.arc,
    };
    let round10_total = (by_type.inf + by_type.cav + by_type.arc) * 10.0;
    let final_score = if round10_total.is_finite() && round10_total > 0.0 {
        round10_total.ceil() as u64
    } else {
        0
    };
    DamageResult {
        by_type,
        round10_total,
        final_score,
    }
}

/// sqrt(count × min(total, bear troop cap)).
fn army_factor(count: u32, army_min: f64) -> f64 {
    (count as f64 * army_min).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Troops;

    fn table() -> TierTable {
        TierTable::from_json_str(r#"{"tiers":{"T6":{"inf":[100],"cav":[100],"arc":[100]}}}"#)
            .unwrap()
    }

    #[test]
    fn unknown_tier_scores_zero() {
        let r = formation_damage(
            &Troops::new(100, 100, 100),
            "T42",
            &table(),
            &EngineConfig::default(),
        );
        assert_eq!(r.final_score, 0);
        assert_eq!(r.round10_total, 0.0);
    }

    #[test]
    fn empty_formation_scores_zero() {
        let r = formation_damage(&Troops::default(), "T6", &table(), &EngineConfig::default());
        assert_eq!(r, DamageResult::default());
    }

    #[test]
    fn known_formation_score() {
        // coef = 12.5 / 8.33333 / 100 = 0.0150000...; factor = sqrt(100 * 100) = 100
        let cfg = EngineConfig::default();
        let r = formation_damage(&Troops::new(100, 0, 0), "T6", &table(), &cfg);
        let expected = 100.0 * (12.5 / cfg.defense_per_troop() / 100.0) * 10.0;
        assert!((r.round10_total - expected).abs() < 1e-9);
        assert_eq!(r.final_score, expected.ceil() as u64);
        assert_eq!(r.by_type.cav, 0.0);
    }

    #[test]
    fn archers_get_skill_bonus() {
        let cfg = EngineConfig::default();
        let inf = formation_damage(&Troops::new(100, 0, 0), "T6", &table(), &cfg);
        let arc = formation_damage(&Troops::new(0, 0, 100), "T6", &table(), &cfg);
        assert!((arc.by_type.arc / inf.by_type.inf - 1.1).abs() < 1e-9);
    }

    #[test]
    fn army_factor_capped_by_bear_troops() {
        let cfg = EngineConfig::default();
        let big = formation_damage(&Troops::new(0, 0, 10_000), "T6", &table(), &cfg);
        let k = 12.5 / cfg.defense_per_troop() / 100.0 * 1.1;
        let expected = (10_000.0f64 * 5_000.0).sqrt() * k;
        assert!((big.by_type.arc - expected).abs() < 1e-9);
    }
}
