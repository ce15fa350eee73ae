//! Tier table: base attack per unit type, keyed by tier id (e.g. "T6").
//!
//! Source shape is `{ "tiers": { "T6": { "inf": [atk, ...], "cav": [...], "arc": [...] } } }`.
//! Only the first element of each sequence is used.

use crate::config::MAX_INPUT_FILE_BYTES;
use crate::util::normalize_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Raw per-tier record as found in the JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierStats {
    #[serde(default)]
    pub inf: Vec<f64>,
    #[serde(default)]
    pub cav: Vec<f64>,
    #[serde(default)]
    pub arc: Vec<f64>,
}

/// Base attack per unit type for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseAttack {
    pub inf: f64,
    pub cav: f64,
    pub arc: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierTable {
    #[serde(default)]
    pub tiers: BTreeMap<String, TierStats>,
}

impl TierStats {
    fn base_attack(&self) -> Option<BaseAttack> {
        let first = |v: &[f64]| v.first().copied().filter(|x| x.is_finite());
        Some(BaseAttack {
            inf: first(&self.inf[..])?,
            cav: first(&self.cav[..])?,
            arc: first(&self.arc[..])?,
        })
    }
}

impl TierTable {
    pub fn from_json_str(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }

    /// Load tier data from a JSON file. Never fails: a missing or malformed file
    /// yields an empty table, which the damage model treats as "no data".
    pub fn load(path: &Path) -> Self {
        let read = crate::util::check_file_size(path, MAX_INPUT_FILE_BYTES)
            .and_then(|_| fs::read_to_string(path).map_err(|e| e.to_string()))
            .and_then(|s| Self::from_json_str(&s));
        match read {
            Ok(t) => {
                tracing::debug!("loaded {} tier(s) from {}", t.tiers.len(), path.display());
                t
            }
            Err(e) => {
                tracing::warn!("tier data unavailable ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Base attack for a tier, or `None` if the tier is unknown or its record is unusable.
    pub fn base_attack(&self, tier_id: &str) -> Option<BaseAttack> {
        self.tiers
            .get(&normalize_id(tier_id))
            .and_then(TierStats::base_attack)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tiers.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
