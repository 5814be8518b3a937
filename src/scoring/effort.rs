// src/scoring/effort.rs
//! Perceived exertion (Borg CR10) to effort score

use crate::config::constants::effort;

/// Effort score for a post-session RPE; `None` above the scale maximum
pub fn effort_score(rpe: u8) -> Option<f64> {
    let score = match rpe {
        4..=6 => effort::OPTIMAL_SCORE,
        3 | 7 => effort::NEAR_OPTIMAL_SCORE,
        2 | 8 => effort::SUBOPTIMAL_SCORE,
        0 | 1 | 9 | 10 => effort::EXTREME_SCORE,
        _ => return None,
    };
    Some(score)
}
