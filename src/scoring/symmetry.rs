// src/scoring/symmetry.rs
//! Bilateral symmetry of per-muscle compliance

/// Symmetry `(1 - |L - R| / (L + R)) * 100`; 100 when both sides are zero
pub fn symmetry_score(left: f64, right: f64) -> f64 {
    let total = left + right;
    if total <= 0.0 {
        return 100.0;
    }
    ((1.0 - (left - right).abs() / total) * 100.0).clamp(0.0, 100.0)
}
