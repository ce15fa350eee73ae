//! Recommendation engine: scans join counts 1..=X and picks the best-filled set.

use crate::allocator::allocate;
use crate::model::{Formation, Fraction, Stockpile};
use serde::Serialize;

const FULL_WEIGHT: f64 = 1e9;
const MIN_FILL_WEIGHT: f64 = 1e6;
const AVG_FILL_WEIGHT: f64 = 1e3;

/// Fill quality of one set of join formations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FillMetrics {
    pub min_fill: f64,
    pub avg_fill: f64,
    /// Formations at or above the fill threshold.
    pub full_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub march_count: u32,
    pub score: f64,
    pub metrics: FillMetrics,
    pub leftover: u64,
}

pub fn fill_ratio(formation: &Formation, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    formation.total() as f64 / capacity as f64
}

pub fn evaluate_set(packs: &[Formation], capacity: u32, threshold: f64) -> FillMetrics {
    if packs.is_empty() {
        return FillMetrics::default();
    }
    let fills: Vec<f64> = packs.iter().map(|p| fill_ratio(p, capacity)).collect();
    let min_fill = fills.iter().copied().fold(f64::INFINITY, f64::min);
    let avg_fill = fills.iter().sum::<f64>() / fills.len() as f64;
    let full_count = fills.iter().filter(|f| **f >= threshold).count() as u32;
    FillMetrics {
        min_fill,
        avg_fill,
        full_count,
    }
}

/// Composite score: full formations dominate, then worst fill, then average fill,
/// then fewer leftover troops.
pub fn score(metrics: &FillMetrics, leftover: u64) -> f64 {
    metrics.full_count as f64 * FULL_WEIGHT
        + metrics.min_fill * MIN_FILL_WEIGHT
        + metrics.avg_fill * AVG_FILL_WEIGHT
        - leftover as f64
}

/// Try every join count in 1..=max_joins against a copy of `stock_after_call`.
/// Ties keep the lowest count. Returns `None` when `max_joins` is 0.
///
/// Joins are built sequentially, so candidate n is candidate n-1 plus one more march;
/// the scan extends a single chain instead of rebuilding every set.
pub fn recommend_march_count(
    fraction: &Fraction,
    stock_after_call: &Stockpile,
    max_joins: u32,
    capacity: u32,
    threshold: f64,
) -> Option<Recommendation> {
    let mut best: Option<Recommendation> = None;
    let mut stock = *stock_after_call;
    let mut min_fill = f64::INFINITY;
    let mut fill_sum = 0.0;
    let mut full_count = 0u32;
    for n in 1..=max_joins {
        let (pack, rest) = allocate(fraction, capacity, stock);
        stock = rest;
        let fill = fill_ratio(&pack, capacity);
        min_fill = min_fill.min(fill);
        fill_sum += fill;
        if fill >= threshold {
            full_count += 1;
        }
        let metrics = FillMetrics {
            min_fill,
            avg_fill: fill_sum / n as f64,
            full_count,
        };
        let leftover = stock.total();
        let cand = Recommendation {
            march_count: n,
            score: score(&metrics, leftover),
            metrics,
            leftover,
        };
        tracing::debug!(
            "candidate n={} full={} min={:.3} avg={:.3} leftover={} score={:.1}",
            n,
            metrics.full_count,
            metrics.min_fill,
            metrics.avg_fill,
            leftover,
            cand.score
        );
        if best.map_or(true, |b| cand.score > b.score) {
            best = Some(cand);
        }
    }
    best
}
