//! Plan diagnostics: observable notes about degraded inputs. They never change results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub summary: String,
}

impl Diagnostic {
    pub fn unknown_tier(tier_id: &str) -> Self {
        Self {
            code: "UNKNOWN_TIER".to_string(),
            severity: Severity::Warn,
            summary: format!(
                "Tier '{}' has no usable data: damage is 0 and joint weights are neutral.",
                tier_id
            ),
        }
    }

    pub fn fraction_fallback() -> Self {
        Self {
            code: "FRACTION_FALLBACK".to_string(),
            severity: Severity::Warn,
            summary: "Fraction could not be derived; using the default 8/12/80 split.".to_string(),
        }
    }

    pub fn invalid_override(raw: &str) -> Self {
        Self {
            code: "INVALID_OVERRIDE".to_string(),
            severity: Severity::Info,
            summary: format!("Manual ratio '{}' is not usable; using computed fraction.", raw),
        }
    }

    pub fn stock_shortfall(underfilled: usize, threshold: f64) -> Self {
        Self {
            code: "STOCK_SHORTFALL".to_string(),
            severity: Severity::Info,
            summary: format!(
                "{} formation(s) below {:.1}% fill: not enough stock.",
                underfilled,
                threshold * 100.0
            ),
        }
    }

    pub fn join_count_clamped(requested: u32, max: u32) -> Self {
        Self {
            code: "JOIN_COUNT_CLAMPED".to_string(),
            severity: Severity::Warn,
            summary: format!(
                "Requested {} join formations; limited to {}.",
                requested, max
            ),
        }
    }

    pub fn no_join_formations() -> Self {
        Self {
            code: "NO_JOIN_FORMATIONS".to_string(),
            severity: Severity::Info,
            summary: "Join formation count is 0; no recommendation computed.".to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.severity {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
        }
    }
}
