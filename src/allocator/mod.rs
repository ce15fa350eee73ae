//! Allocator: turns a fraction and a capacity into integer formations drawn from stock.
//!
//! Stock is threaded by value: every call takes the current snapshot and hands back
//! the remainder alongside the formation it built.

use crate::model::{Formation, Fraction, Stockpile};

/// Build one formation of at most `capacity` troops and return it with the remaining stock.
///
/// Infantry and cavalry are rounded from the fraction and capped at stock; archers take
/// whatever capacity remains, capped at archer stock.
pub fn allocate(fraction: &Fraction, capacity: u32, stock: Stockpile) -> (Formation, Stockpile) {
    if capacity == 0 {
        return (Formation::default(), stock);
    }
    let cap = capacity as f64;
    let want_inf = round_share(fraction.inf, cap).min(capacity);
    let want_cav = round_share(fraction.cav, cap).min(capacity - want_inf);

    let inf = want_inf.min(stock.inf);
    let cav = want_cav.min(stock.cav);
    let arc = stock.arc.min(capacity - inf - cav);

    let formation = Formation { inf, cav, arc };
    let rest = stock.saturating_sub(&formation);
    (formation, rest)
}

/// Build `count` formations of `capacity` in sequence, each seeing the stock left by
/// the ones before it.
pub fn allocate_many(
    fraction: &Fraction,
    capacity: u32,
    count: u32,
    mut stock: Stockpile,
) -> (Vec<Formation>, Stockpile) {
    let mut out = Vec::new();
    for _ in 0..count {
        let (f, rest) = allocate(fraction, capacity, stock);
        out.push(f);
        stock = rest;
    }
    (out, stock)
}

fn round_share(share: f64, cap: f64) -> u32 {
    let v = (share * cap).round();
    if v.is_finite() && v > 0.0 {
        v.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Troops;

    #[test]
    fn neutral_call_splits_evenly() {
        let (f, rest) = allocate(&Fraction::neutral(), 300, Troops::new(1000, 1000, 1000));
        assert_eq!(f, Troops::new(100, 100, 100));
        assert_eq!(rest, Troops::new(900, 900, 900));
    }

    #[test]
    fn archers_take_rounding_remainder() {
        let (f, _) = allocate(&Fraction::neutral(), 200, Troops::new(1000, 1000, 1000));
        assert_eq!(f, Troops::new(67, 67, 66));
        assert_eq!(f.total(), 200);
    }

    #[test]
    fn archers_absorb_infantry_shortfall() {
        let (f, rest) = allocate(&Fraction::normalize(0.5, 0.3, 0.2), 100, Troops::new(10, 100, 100));
        assert_eq!(f, Troops::new(10, 30, 60));
        assert_eq!(rest, Troops::new(0, 70, 40));
    }

    #[test]
    fn zero_capacity_leaves_stock_untouched() {
        let stock = Troops::new(5, 5, 5);
        let (f, rest) = allocate(&Fraction::neutral(), 0, stock);
        assert_eq!(f, Troops::default());
        assert_eq!(rest, stock);
    }

    #[test]
    fn zero_stock_gives_empty_formations() {
        let (packs, rest) = allocate_many(&Fraction::fallback(), 500, 4, Troops::default());
        assert_eq!(packs.len(), 4);
        assert!(packs.iter().all(|p| p.total() == 0));
        assert_eq!(rest, Troops::default());
    }

    #[test]
    fn half_rounding_never_exceeds_capacity() {
        let f = Fraction::normalize(0.5, 0.5, 0.0);
        let (p, _) = allocate(&f, 3, Troops::new(10, 10, 10));
        assert!(p.total() <= 3);
        assert_eq!(p, Troops::new(2, 1, 0));
    }

    #[test]
    fn sequential_joins_conserve_stock() {
        let stock = Troops::new(350, 420, 1300);
        let (packs, rest) = allocate_many(&Fraction::normalize(0.1, 0.2, 0.7), 450, 5, stock);
        let used = packs.iter().fold(Troops::default(), |acc, p| acc + *p);
        assert_eq!(used + rest, stock);
        assert!(packs.iter().all(|p| p.total() <= 450));
    }
}
