//! FSRS-4.5 memory model formulas
//!
//! Pure functions over (stability, difficulty, retrievability). They are
//! infallible: callers validate inputs before reaching here.

use super::parameters::WEIGHT_COUNT;
use super::Rating;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Lower difficulty bound
pub const MIN_DIFFICULTY: f64 = 1.0;

/// Upper difficulty bound
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Stability floor, applied at initialization and after every recurrence
pub const MIN_STABILITY: f64 = 0.1;

/// Forgetting curve scale: R = (1 + t / (9 S))^-1
const FORGETTING_FACTOR: f64 = 9.0;

// ============================================================================
// RETRIEVABILITY
// ============================================================================

/// Probability of recall after `elapsed_days` for a memory of `stability`.
///
/// Power-law forgetting curve. Returns 0 for non-positive stability.
#[inline]
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    (1.0 + elapsed_days / (FORGETTING_FACTOR * stability)).powi(-1)
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Difficulty after the first-ever rating
pub fn initial_difficulty(w: &[f64; WEIGHT_COUNT], rating: Rating) -> f64 {
    let g = rating.as_f64();
    (w[4] - (w[5] * (g - 1.0)).exp() + 1.0).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Stability after the first-ever rating (w0-w3, floored)
pub fn initial_stability(w: &[f64; WEIGHT_COUNT], rating: Rating) -> f64 {
    let s0 = match rating {
        Rating::Again => w[0],
        Rating::Hard => w[1],
        Rating::Good => w[2],
        Rating::Easy => w[3],
    };
    s0.max(MIN_STABILITY)
}

// ============================================================================
// DIFFICULTY
// ============================================================================

/// Pull difficulty toward the initial baseline w4
#[inline]
pub fn mean_reversion(w: &[f64; WEIGHT_COUNT], d: f64) -> f64 {
    w[7] * w[4] + (1.0 - w[7]) * d
}

/// Difficulty after a subsequent rating, clamped to [1, 10]
pub fn next_difficulty(w: &[f64; WEIGHT_COUNT], d: f64, rating: Rating) -> f64 {
    let next_d = d - w[6] * (rating.as_f64() - 3.0);
    mean_reversion(w, next_d).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

// ============================================================================
// STABILITY
// ============================================================================

/// Stability after a successful recall (Hard, Good, or Easy) in Review.
///
/// w15 scales Hard, w16 scales Easy. No floor is applied here.
pub fn next_recall_stability(
    w: &[f64; WEIGHT_COUNT],
    d: f64,
    s: f64,
    r: f64,
    rating: Rating,
) -> f64 {
    let hard_penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { w[16] } else { 1.0 };

    s * (1.0
        + w[8].exp()
            * (11.0 - d)
            * s.powf(-w[9])
            * (((1.0 - r) * w[10]).exp() - 1.0)
            * hard_penalty
            * easy_bonus)
}

/// Stability after a lapse (Again) in Review. No floor is applied here.
pub fn next_forget_stability(w: &[f64; WEIGHT_COUNT], d: f64, s: f64, r: f64) -> f64 {
    w[11] * d.powf(-w[12]) * ((s + 1.0).powf(w[13]) - 1.0) * ((1.0 - r) * w[14]).exp()
}

// ============================================================================
// INTERVAL
// ============================================================================

/// Review interval in days for a stability and target retention.
///
/// Rounded, then clamped to `[1, maximum_interval]`.
pub fn next_interval(stability: f64, request_retention: f64, maximum_interval: u32) -> u32 {
    let interval = (stability / FORGETTING_FACTOR * (request_retention.powi(-1) - 1.0)).round();
    // NaN falls through max() to the lower bound
    interval.max(1.0).min(maximum_interval as f64) as u32
}

// ============================================================================
// TESTS
// ============================================================================
