//! Fraction engine: derives the inf/cav/arc split a plan allocates with.
//!
//! Two strategies sit behind [`Strategy::derive_fraction`]:
//! - closed-form ratio from player attack/lethality stats, clamped to the configured band;
//! - joint call+join allocation weighted by squared per-tier damage coefficients and
//!   capped by available stock.

use crate::config::{BoundsConfig, EngineConfig, EPSILON};
use crate::damage::damage_coefficients;
use crate::model::{Fraction, Stockpile, UnitStats, UnitType};
use crate::tiers::TierTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller-facing selection of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Closed-form ratio from unit stats.
    Ratio,
    /// Joint allocation, plain squared coefficients.
    Balanced,
    /// Joint allocation with archer coefficient doubled.
    Magic,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ratio" | "ratio11" => Ok(Mode::Ratio),
            "balanced" | "magic11" => Ok(Mode::Balanced),
            "magic" | "magic12" => Ok(Mode::Magic),
            other => Err(format!(
                "unknown mode '{}' (expected ratio, balanced or magic)",
                other
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Ratio => "ratio",
            Mode::Balanced => "balanced",
            Mode::Magic => "magic",
        };
        f.write_str(s)
    }
}

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct FractionContext<'a> {
    pub tier_id: &'a str,
    pub tiers: &'a TierTable,
    pub config: &'a EngineConfig,
    pub stock: &'a Stockpile,
    pub rally_size: u32,
    pub join_cap: u32,
    pub join_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FractionOutcome {
    pub fraction: Fraction,
    /// Set when the derivation could not produce a usable split and the fallback was used.
    pub fell_back: bool,
}

impl FractionOutcome {
    fn derived(fraction: Fraction) -> Self {
        Self {
            fraction,
            fell_back: false,
        }
    }

    fn fallback() -> Self {
        Self {
            fraction: Fraction::fallback(),
            fell_back: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    ExactRatio(UnitStats),
    Joint { archer_multiplier: f64 },
}

impl Strategy {
    pub fn from_mode(mode: Mode, stats: UnitStats) -> Self {
        match mode {
            Mode::Ratio => Strategy::ExactRatio(stats),
            Mode::Balanced => Strategy::Joint {
                archer_multiplier: 1.0,
            },
            Mode::Magic => Strategy::Joint {
                archer_multiplier: 2.0,
            },
        }
    }

    pub fn derive_fraction(&self, ctx: &FractionContext<'_>) -> FractionOutcome {
        let out = match self {
            Strategy::ExactRatio(stats) => {
                let raw = exact_fraction(stats, ctx.tier_id, ctx.config);
                let bounded = enforce_bounds(&raw.fraction, &ctx.config.bounds);
                match bounded {
                    Some(f) => FractionOutcome {
                        fraction: f,
                        fell_back: raw.fell_back,
                    },
                    None => FractionOutcome::fallback(),
                }
            }
            Strategy::Joint { archer_multiplier } => joint_fraction(ctx, *archer_multiplier),
        };
        tracing::debug!(
            "fraction {:?}: inf={:.4} cav={:.4} arc={:.4} fell_back={}",
            self,
            out.fraction.inf,
            out.fraction.cav,
            out.fraction.arc,
            out.fell_back
        );
        out
    }
}

/// (1 + attack/100) × (1 + lethality/100), floored at a small positive epsilon.
pub fn attack_factor(attack: f64, lethality: f64) -> f64 {
    let f = (1.0 + attack / 100.0) * (1.0 + lethality / 100.0);
    if f.is_finite() {
        f.max(EPSILON)
    } else {
        EPSILON
    }
}

/// Unbounded closed-form split: squared weighted attack factors, normalized.
pub fn exact_fraction(stats: &UnitStats, tier_id: &str, cfg: &EngineConfig) -> FractionOutcome {
    let a_inf = attack_factor(stats.inf.attack, stats.inf.lethality);
    let a_cav = attack_factor(stats.cav.attack, stats.cav.lethality);
    let a_arc = attack_factor(stats.arc.attack, stats.arc.lethality);

    let alpha = a_inf / cfg.inf_normalization;
    let beta = a_cav;
    let gamma = cfg.archer.for_tier(tier_id) * a_arc;

    match Fraction::try_normalize(alpha * alpha, beta * beta, gamma * gamma) {
        Some(f) => FractionOutcome::derived(f),
        None => FractionOutcome::fallback(),
    }
}

/// Clamp infantry into its band, floor cavalry, give archers the remainder.
/// Returns `None` if the result cannot be normalized.
pub fn enforce_bounds(f: &Fraction, b: &BoundsConfig) -> Option<Fraction> {
    let mut i = f.inf;
    let mut c = f.cav;

    if i < b.inf_min {
        i = b.inf_min;
    }
    if i > b.inf_max {
        i = b.inf_max;
    }
    if c < b.cav_min {
        c = b.cav_min;
    }

    let mut a = 1.0 - i - c;
    if a < 0.0 {
        c = b.cav_min.max(1.0 - i);
        a = 1.0 - i - c;
        if a < 0.0 {
            a = 0.0;
            c = 1.0 - i;
        }
    }
    Fraction::try_normalize(i, c, a)
}

/// Squared allocation weights for the joint strategy. Unknown tier gives 1:1:1.
pub fn joint_weights(
    tier_id: &str,
    tiers: &TierTable,
    cfg: &EngineConfig,
    archer_multiplier: f64,
) -> [f64; 3] {
    let (k_inf, k_cav, k_arc) = match tiers.base_attack(tier_id) {
        Some(base) => {
            let k = damage_coefficients(&base, cfg);
            (k.inf, k.cav, k.arc)
        }
        None => (1.0, 1.0, 1.0),
    };
    let k_arc = k_arc * archer_multiplier;
    [k_inf * k_inf, k_cav * k_cav, k_arc * k_arc]
}

fn weight_of(w: &[f64; 3], t: UnitType) -> f64 {
    match t {
        UnitType::Inf => w[0],
        UnitType::Cav => w[1],
        UnitType::Arc => w[2],
    }
}

/// Redistribution order: heaviest weight first; equal weights keep arc, cav, inf order.
pub fn priority_order(w: &[f64; 3]) -> [UnitType; 3] {
    let mut order = [UnitType::Arc, UnitType::Cav, UnitType::Inf];
    order.sort_by(|a, b| weight_of(w, *b).total_cmp(&weight_of(w, *a)));
    order
}

/// Hand out `deficit` troops to types with free stock, in priority order, until
/// the deficit is gone or no type has stock left. Returns the unfilled remainder.
pub fn redistribute_shortfall(
    targets: &mut [u64; 3],
    stock: &Stockpile,
    mut deficit: u64,
    order: &[UnitType; 3],
) -> u64 {
    let idx = |t: UnitType| match t {
        UnitType::Inf => 0,
        UnitType::Cav => 1,
        UnitType::Arc => 2,
    };
    while deficit > 0 {
        let mut changed = false;
        for t in order {
            let i = idx(*t);
            let free = (stock.get(*t) as u64).saturating_sub(targets[i]);
            if free > 0 {
                let give = free.min(deficit);
                targets[i] += give;
                deficit -= give;
                changed = true;
                if deficit == 0 {
                    break;
                }
            }
        }
        if !changed {
            break;
        }
    }
    deficit
}

/// Joint strategy: split the whole call + joins troop total by weight, cap at stock,
/// redistribute the shortfall, and normalize the resulting targets.
pub fn joint_fraction(ctx: &FractionContext<'_>, archer_multiplier: f64) -> FractionOutcome {
    let total = ctx.rally_size as u64 + ctx.join_count as u64 * ctx.join_cap as u64;
    let w = joint_weights(ctx.tier_id, ctx.tiers, ctx.config, archer_multiplier);
    let sum_w = (w[0] + w[1] + w[2]).max(1e-9);

    let mut targets = [0u64; 3];
    for (i, t) in UnitType::ALL.iter().enumerate() {
        let ideal = (total as f64 * (w[i] / sum_w)).round();
        let ideal = if ideal.is_finite() && ideal > 0.0 {
            ideal as u64
        } else {
            0
        };
        targets[i] = ideal.min(ctx.stock.get(*t) as u64);
    }

    let used: u64 = targets.iter().sum();
    let deficit = total.saturating_sub(used);
    let order = priority_order(&w);
    let unfilled = redistribute_shortfall(&mut targets, ctx.stock, deficit, &order);
    if unfilled > 0 {
        tracing::debug!("joint allocation short by {} troop(s)", unfilled);
    }

    match Fraction::try_normalize(targets[0] as f64, targets[1] as f64, targets[2] as f64) {
        Some(f) => FractionOutcome::derived(f),
        None => FractionOutcome::fallback(),
    }
}
