//! Manual ratio parsing: "50/30/20", "8, 12, 80", "10 15" (archer takes the rest).

use crate::model::Fraction;

/// Parse a free-form inf/cav/arc split. Percent signs are ignored; separators are
/// `/`, `,` or whitespace. A missing archer value defaults to `100 - inf - cav`.
/// Returns `None` for empty, negative or zero-sum input.
pub fn parse_triplet(s: &str) -> Option<Fraction> {
    let cleaned = s.replace('%', "");
    let parts: Vec<f64> = cleaned
        .trim()
        .split(|c: char| c == '/' || c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse::<f64>().ok())
        .filter(|x| x.is_finite())
        .collect();
    let (&i, rest) = parts.split_first()?;
    let c = rest.first().copied().unwrap_or(0.0);
    let a = rest.get(1).copied().unwrap_or(100.0 - (i + c));
    Fraction::try_normalize(i, c, a)
}

/// Format a fraction as whole percentages; archer takes the rounding remainder.
pub fn to_pct_triplet(f: &Fraction) -> String {
    let sum = f.sum();
    let sum = if sum.is_finite() && sum > 0.0 { sum } else { 1.0 };
    let pi = (f.inf / sum * 100.0).round() as i64;
    let pc = (f.cav / sum * 100.0).round() as i64;
    let pa = 100 - pi - pc;
    format!("{}/{}/{}", pi, pc, pa)
}
