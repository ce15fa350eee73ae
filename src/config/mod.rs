//! Engine configuration: bear constants, fraction bounds, archer coefficients.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Maximum size in bytes accepted for a config or tier file.
pub const MAX_INPUT_FILE_BYTES: usize = 1024 * 1024;

/// Troop cap of the bear; larger formations stop increasing the army factor.
pub const BEAR_TROOPS: f64 = 5000.0;
pub const BEAR_DEF: f64 = 10.0;
pub const BEAR_HP: f64 = 83.3333;

pub const ATTACK_BONUS: f64 = 0.25;
pub const BASE_LETHALITY: f64 = 10.0;

pub const SKILLMOD_INF: f64 = 1.00;
pub const SKILLMOD_CAV: f64 = 1.00;
/// Archers get a flat 10% skill bonus against the bear.
pub const SKILLMOD_ARC: f64 = 1.10;

pub const INF_MIN_PCT: f64 = 0.075;
pub const INF_MAX_PCT: f64 = 0.10;
pub const CAV_MIN_PCT: f64 = 0.10;

/// A join formation counts as "full" at or above this fill ratio.
pub const FILL_THRESHOLD: f64 = 0.923;

/// Number of scoreboard windows shown per plan.
pub const WINDOWS: u32 = 5;

/// Upper bound on join formations per plan; larger requests are clamped.
pub const MAX_JOIN_FORMATIONS: u32 = 100;

/// Divisor applied to the infantry attack factor in the closed-form ratio.
pub const INF_NORMALIZATION: f64 = 1.12;

pub const LOW_TIER_ID: &str = "T6";
pub const LOW_TIER_ARCHER_COEF: f64 = 4.4 / 1.25;
pub const HIGH_TIER_ARCHER_COEF: f64 = 2.78 / 1.45;

/// Fraction used whenever a derivation produces no usable split (inf, cav, arc).
pub const FALLBACK_FRACTION: (f64, f64, f64) = (0.08, 0.12, 0.80);

/// Smallest attack factor / weight sum allowed before dividing.
pub const EPSILON: f64 = 1e-6;

/// Bear-side constants used by the damage model.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_bear_troops")]
    pub troops: f64,
    #[serde(default = "default_bear_def")]
    pub defense: f64,
    #[serde(default = "default_bear_hp")]
    pub health: f64,
    #[serde(default = "default_attack_bonus")]
    pub attack_bonus: f64,
    #[serde(default = "default_base_lethality")]
    pub base_lethality: f64,
}

/// Per-type skill modifiers applied to damage coefficients.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillConfig {
    #[serde(default = "default_skill_inf")]
    pub inf: f64,
    #[serde(default = "default_skill_cav")]
    pub cav: f64,
    #[serde(default = "default_skill_arc")]
    pub arc: f64,
}

/// Clamp band for the closed-form fraction.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundsConfig {
    #[serde(default = "default_inf_min")]
    pub inf_min: f64,
    #[serde(default = "default_inf_max")]
    pub inf_max: f64,
    #[serde(default = "default_cav_min")]
    pub cav_min: f64,
}

/// Tier-dependent archer coefficient for the closed-form ratio.
/// `low_tier` gets `low`, every other tier gets `high`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArcherCoefConfig {
    #[serde(default = "default_low_tier")]
    pub low_tier: String,
    #[serde(default = "default_low_coef")]
    pub low: f64,
    #[serde(default = "default_high_coef")]
    pub high: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub skill: SkillConfig,
    #[serde(default)]
    pub bounds: BoundsConfig,
    #[serde(default)]
    pub archer: ArcherCoefConfig,
    #[serde(default = "default_inf_normalization")]
    pub inf_normalization: f64,
    #[serde(default = "default_fill_threshold")]
    pub fill_threshold: f64,
    #[serde(default = "default_windows")]
    pub windows: u32,
    #[serde(default = "default_max_join_formations")]
    pub max_join_formations: u32,
}

fn default_bear_troops() -> f64 {
    BEAR_TROOPS
}

fn default_bear_def() -> f64 {
    BEAR_DEF
}

fn default_bear_hp() -> f64 {
    BEAR_HP
}

fn default_attack_bonus() -> f64 {
    ATTACK_BONUS
}

fn default_base_lethality() -> f64 {
    BASE_LETHALITY
}

fn default_skill_inf() -> f64 {
    SKILLMOD_INF
}

fn default_skill_cav() -> f64 {
    SKILLMOD_CAV
}

fn default_skill_arc() -> f64 {
    SKILLMOD_ARC
}

fn default_inf_min() -> f64 {
    INF_MIN_PCT
}

fn default_inf_max() -> f64 {
    INF_MAX_PCT
}

fn default_cav_min() -> f64 {
    CAV_MIN_PCT
}

fn default_low_tier() -> String {
    LOW_TIER_ID.to_string()
}

fn default_low_coef() -> f64 {
    LOW_TIER_ARCHER_COEF
}

fn default_high_coef() -> f64 {
    HIGH_TIER_ARCHER_COEF
}

fn default_inf_normalization() -> f64 {
    INF_NORMALIZATION
}

fn default_fill_threshold() -> f64 {
    FILL_THRESHOLD
}

fn default_windows() -> u32 {
    WINDOWS
}

fn default_max_join_formations() -> u32 {
    MAX_JOIN_FORMATIONS
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            troops: BEAR_TROOPS,
            defense: BEAR_DEF,
            health: BEAR_HP,
            attack_bonus: ATTACK_BONUS,
            base_lethality: BASE_LETHALITY,
        }
    }
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            inf: SKILLMOD_INF,
            cav: SKILLMOD_CAV,
            arc: SKILLMOD_ARC,
        }
    }
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            inf_min: INF_MIN_PCT,
            inf_max: INF_MAX_PCT,
            cav_min: CAV_MIN_PCT,
        }
    }
}

impl Default for ArcherCoefConfig {
    fn default() -> Self {
        Self {
            low_tier: LOW_TIER_ID.to_string(),
            low: LOW_TIER_ARCHER_COEF,
            high: HIGH_TIER_ARCHER_COEF,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            skill: SkillConfig::default(),
            bounds: BoundsConfig::default(),
            archer: ArcherCoefConfig::default(),
            inf_normalization: INF_NORMALIZATION,
            fill_threshold: FILL_THRESHOLD,
            windows: WINDOWS,
            max_join_formations: MAX_JOIN_FORMATIONS,
        }
    }
}

impl ArcherCoefConfig {
    pub fn for_tier(&self, tier_id: &str) -> f64 {
        if tier_id == self.low_tier {
            self.low
        } else {
            self.high
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    /// Load from a TOML file; `None` means built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        crate::util::check_file_size(path, MAX_INPUT_FILE_BYTES)?;
        let s = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let cfg = Self::from_toml_str(&s)?;
        tracing::debug!("loaded engine config from {}", path.display());
        Ok(cfg)
    }

    /// Bear defense per troop: health × defense / 100.
    pub fn defense_per_troop(&self) -> f64 {
        self.target.health * self.target.defense / 100.0
    }

    /// Effective per-troop attack for a base attack value.
    pub fn per_troop_attack(&self, base_attack: f64) -> f64 {
        base_attack * (1.0 + self.target.attack_bonus) * (self.target.base_lethality / 100.0)
    }
}
