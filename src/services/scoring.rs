// src/services/scoring.rs

use crate::config::{PERFECT_SCORE_BONUS, POINTS_PER_CORRECT};

/// Points for an attempt: 10 per correct answer, plus a flat 20 when every
/// question of the attempt was answered correctly.
pub fn compute_score(correct_count: u32, total_questions: usize) -> i32 {
    let base = correct_count as i32 * POINTS_PER_CORRECT;
    if is_perfect(correct_count, total_questions) {
        base + PERFECT_SCORE_BONUS
    } else {
        base
    }
}

pub fn is_perfect(correct_count: u32, total_questions: usize) -> bool {
    total_questions > 0 && correct_count as usize == total_questions
}
