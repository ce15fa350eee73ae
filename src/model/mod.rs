//! Troop, fraction and unit-stat model shared by every stage of a plan.

use crate::config::FALLBACK_FRACTION;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Unit type. Order here is the display order (inf, cav, arc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Inf,
    Cav,
    Arc,
}

impl UnitType {
    pub const ALL: [UnitType; 3] = [UnitType::Inf, UnitType::Cav, UnitType::Arc];
}

/// Counts per unit type. Used both as a stockpile and as a formation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Troops {
    pub inf: u32,
    pub cav: u32,
    pub arc: u32,
}

/// Available troops; decremented as formations are built.
pub type Stockpile = Troops;

/// One fielded group: the call rally or a join march.
pub type Formation = Troops;

impl Troops {
    pub fn new(inf: u32, cav: u32, arc: u32) -> Self {
        Self { inf, cav, arc }
    }

    pub fn total(&self) -> u64 {
        self.inf as u64 + self.cav as u64 + self.arc as u64
    }

    pub fn get(&self, t: UnitType) -> u32 {
        match t {
            UnitType::Inf => self.inf,
            UnitType::Cav => self.cav,
            UnitType::Arc => self.arc,
        }
    }

    pub fn get_mut(&mut self, t: UnitType) -> &mut u32 {
        match t {
            UnitType::Inf => &mut self.inf,
            UnitType::Cav => &mut self.cav,
            UnitType::Arc => &mut self.arc,
        }
    }

    /// Remove `other` from self. Callers only subtract what was capped at self.
    pub fn saturating_sub(&self, other: &Troops) -> Troops {
        Troops {
            inf: self.inf.saturating_sub(other.inf),
            cav: self.cav.saturating_sub(other.cav),
            arc: self.arc.saturating_sub(other.arc),
        }
    }
}

impl Add for Troops {
    type Output = Troops;

    fn add(self, other: Troops) -> Troops {
        Troops {
            inf: self.inf.saturating_add(other.inf),
            cav: self.cav.saturating_add(other.cav),
            arc: self.arc.saturating_add(other.arc),
        }
    }
}

/// Proportional split (inf, cav, arc). Components are non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fraction {
    pub inf: f64,
    pub cav: f64,
    pub arc: f64,
}

impl Fraction {
    pub fn fallback() -> Self {
        let (inf, cav, arc) = FALLBACK_FRACTION;
        Self { inf, cav, arc }
    }

    /// Equal thirds.
    pub fn neutral() -> Self {
        Self {
            inf: 1.0 / 3.0,
            cav: 1.0 / 3.0,
            arc: 1.0 / 3.0,
        }
    }

    /// Normalize raw weights. Returns `None` when any weight is negative or non-finite,
    /// or when the sum is not positive.
    pub fn try_normalize(inf: f64, cav: f64, arc: f64) -> Option<Self> {
        let parts = [inf, cav, arc];
        if parts.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return None;
        }
        let sum = inf + cav + arc;
        if !sum.is_finite() || sum <= 0.0 {
            return None;
        }
        Some(Self {
            inf: inf / sum,
            cav: cav / sum,
            arc: arc / sum,
        })
    }

    /// Normalize raw weights, substituting the fallback split when unusable.
    pub fn normalize(inf: f64, cav: f64, arc: f64) -> Self {
        Self::try_normalize(inf, cav, arc).unwrap_or_else(Self::fallback)
    }

    pub fn get(&self, t: UnitType) -> f64 {
        match t {
            UnitType::Inf => self.inf,
            UnitType::Cav => self.cav,
            UnitType::Arc => self.arc,
        }
    }

    pub fn sum(&self) -> f64 {
        self.inf + self.cav + self.arc
    }

    pub fn is_valid(&self) -> bool {
        [self.inf, self.cav, self.arc]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
            && (self.sum() - 1.0).abs() < 1e-9
    }
}

/// Attack% and lethality% for one unit type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatPair {
    pub attack: f64,
    pub lethality: f64,
}

/// Player stat bonuses per unit type, used by the closed-form ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub inf: StatPair,
    pub cav: StatPair,
    pub arc: StatPair,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn troops_total_and_sub() {
        let a = Troops::new(10, 20, 30);
        assert_eq!(a.total(), 60);
        let b = a.saturating_sub(&Troops::new(5, 25, 30));
        assert_eq!(b, Troops::new(5, 0, 0));
        assert_eq!((b + Troops::new(1, 1, 1)).total(), 8);
    }

    #[test]
    fn normalize_sums_to_one() {
        let f = Fraction::normalize(1.0, 2.0, 7.0);
        assert!(f.is_valid());
        assert!((f.arc - 0.7).abs() < 1e-12);
    }

    #[test]
    fn normalize_falls_back_on_zero_or_nan() {
        assert_eq!(Fraction::normalize(0.0, 0.0, 0.0), Fraction::fallback());
        assert_eq!(Fraction::normalize(f64::NAN, 1.0, 1.0), Fraction::fallback());
        assert!(Fraction::try_normalize(-1.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn unit_type_accessors() {
        let mut t = Troops::new(1, 2, 3);
        *t.get_mut(UnitType::Cav) += 5;
        assert_eq!(t.get(UnitType::Cav), 7);
        assert_eq!(UnitType::ALL.len(), 3);
    }
}
