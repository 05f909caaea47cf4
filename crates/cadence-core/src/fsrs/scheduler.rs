//! FSRS State Transition Engine
//!
//! Applies one rating to one item snapshot and returns the next snapshot plus
//! a review-log record. The scheduler owns nothing but its parameter set, so
//! independent instances can run side by side on any number of threads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{
    MAX_DIFFICULTY, MIN_DIFFICULTY, MIN_STABILITY, initial_difficulty, initial_stability,
    next_difficulty, next_forget_stability, next_interval, next_recall_stability, retrievability,
};
use super::parameters::FSRSParameters;
use crate::error::{CadenceError, Result};

// ============================================================================
// RATING
// ============================================================================

/// Learner's self-assessment of one review
///
/// Serialized as its integer value (1-4), the way review logs store it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rating {
    /// Failed to recall
    Again = 1,
    /// Recalled with serious difficulty
    Hard = 2,
    /// Recalled after a hesitation
    Good = 3,
    /// Recalled effortlessly
    Easy = 4,
}

impl Rating {
    /// All ratings, in ascending order
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Create from the stored integer value
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }

    /// Integer value (1-4)
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    #[inline]
    pub(crate) fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = CadenceError;

    fn try_from(value: u8) -> Result<Self> {
        Rating::from_value(value).ok_or(CadenceError::InvalidRating(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Rating {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "again" | "1" => Ok(Rating::Again),
            "hard" | "2" => Ok(Rating::Hard),
            "good" | "3" => Ok(Rating::Good),
            "easy" | "4" => Ok(Rating::Easy),
            other => Err(CadenceError::InvalidArgument(format!(
                "Unknown rating: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// LEARNING STATE
// ============================================================================

/// Position of an item in the learning state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningState {
    /// Never reviewed
    #[default]
    New,
    /// In the initial learning steps
    Learning,
    /// In the regular review cycle
    Review,
    /// Lapsed out of Review, relearning
    Relearning,
}

impl LearningState {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningState::New => "new",
            LearningState::Learning => "learning",
            LearningState::Review => "review",
            LearningState::Relearning => "relearning",
        }
    }

    /// Learning and Relearning use short same-day/next-day steps
    #[inline]
    pub fn is_learning_phase(&self) -> bool {
        matches!(self, LearningState::Learning | LearningState::Relearning)
    }
}

impl std::fmt::Display for LearningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LearningState {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(LearningState::New),
            "learning" => Ok(LearningState::Learning),
            "review" => Ok(LearningState::Review),
            "relearning" => Ok(LearningState::Relearning),
            _ => Err(CadenceError::InvalidState(s.to_string())),
        }
    }
}

// ============================================================================
// ITEM SCHEDULING STATE
// ============================================================================

/// Scheduling snapshot of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FSRSState {
    /// Days until recall probability decays to the target retention
    pub stability: f64,
    /// Item hardness, 0 before the first rating, else in [1, 10]
    pub difficulty: f64,
    /// Days since the previous review, as computed at the last schedule call
    pub elapsed_days: u32,
    /// Interval assigned by the last schedule call
    pub scheduled_days: u32,
    /// Number of schedule calls applied
    pub reps: u32,
    /// Number of lapses
    pub lapses: u32,
    /// Learning state
    pub state: LearningState,
    /// Time of the last review, None before the first
    pub last_review: Option<DateTime<Utc>>,
    /// When the item should next be presented
    pub due: DateTime<Utc>,
}

impl FSRSState {
    /// Fresh snapshot for an item that has never been reviewed
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: LearningState::New,
            last_review: None,
            due: now,
        }
    }

    /// Whole days elapsed since the last review, never negative
    pub fn elapsed_days_at(&self, now: DateTime<Utc>) -> u32 {
        match self.last_review {
            Some(last) => {
                let days = (now - last).num_days().max(0);
                u32::try_from(days).unwrap_or(u32::MAX)
            }
            None => 0,
        }
    }

    /// Reject snapshots that no sequence of schedule calls could produce
    pub fn validate(&self) -> Result<()> {
        if !self.stability.is_finite() || self.stability < 0.0 {
            return Err(CadenceError::InvalidArgument(format!(
                "stability must be finite and non-negative, got {}",
                self.stability
            )));
        }
        if !self.difficulty.is_finite() || self.difficulty < 0.0 {
            return Err(CadenceError::InvalidArgument(format!(
                "difficulty must be finite and non-negative, got {}",
                self.difficulty
            )));
        }

        if self.state != LearningState::New {
            if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
                return Err(CadenceError::InvalidArgument(format!(
                    "difficulty of a {} item must be in [1, 10], got {}",
                    self.state, self.difficulty
                )));
            }
            if self.stability <= 0.0 {
                return Err(CadenceError::InvalidArgument(format!(
                    "stability of a {} item must be positive",
                    self.state
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// REVIEW LOG
// ============================================================================

/// Record of one review event, persisted by the caller with the new snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    /// Rating given
    pub rating: Rating,
    /// Interval assigned
    pub scheduled_days: u32,
    /// Days since the previous review
    pub elapsed_days: u32,
    /// Learning state before the review
    pub state_before: LearningState,
    /// Stability after the review
    pub stability: f64,
    /// Difficulty after the review
    pub difficulty: f64,
    /// Stability before the review
    pub stability_before: f64,
    /// Difficulty before the review
    pub difficulty_before: f64,
    /// When the review happened
    pub reviewed_at: DateTime<Utc>,
}

/// Outcome of a schedule call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// Updated snapshot
    pub card: FSRSState,
    /// Log record for this review
    pub log: ReviewLog,
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Stateless scheduler parametrized by one validated parameter set
#[derive(Debug, Clone, Default)]
pub struct FSRSScheduler {
    params: FSRSParameters,
}

impl FSRSScheduler {
    /// Create a scheduler with a validated parameter set
    pub fn new(params: FSRSParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Get the active parameters
    pub fn params(&self) -> &FSRSParameters {
        &self.params
    }

    /// Swap the parameter set between calls
    pub fn set_parameters(&mut self, params: FSRSParameters) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Apply a raw integer rating as stored by collaborators
    pub fn review(&self, card: &FSRSState, rating: u8, now: DateTime<Utc>) -> Result<ReviewResult> {
        let rating = Rating::try_from(rating).inspect_err(|e| {
            tracing::warn!("Rejected review: {}", e);
        })?;
        self.schedule(card, rating, now)
    }

    /// Apply one rating to one snapshot.
    ///
    /// Returns the next snapshot and the log record. Fails on a snapshot that
    /// fails [`FSRSState::validate`], on a counter already at `u32::MAX`, and
    /// on a due date past the calendar range.
    pub fn schedule(
        &self,
        card: &FSRSState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<ReviewResult> {
        card.validate().inspect_err(|e| {
            tracing::warn!("Rejected schedule input: {}", e);
        })?;

        let w = &self.params.w;
        let elapsed_days = card.elapsed_days_at(now);

        let (next_state, stability, difficulty, lapses) = match card.state {
            LearningState::New => {
                let next_state = match rating {
                    Rating::Again | Rating::Hard => LearningState::Learning,
                    Rating::Good | Rating::Easy => LearningState::Review,
                };
                let lapses = if rating == Rating::Again { 1 } else { card.lapses };
                (
                    next_state,
                    initial_stability(w, rating),
                    initial_difficulty(w, rating),
                    lapses,
                )
            }
            LearningState::Learning | LearningState::Relearning => {
                let (next_state, lapses) = match rating {
                    Rating::Again if card.state == LearningState::Relearning => {
                        (LearningState::Relearning, increment(card.lapses, "lapses")?)
                    }
                    Rating::Again | Rating::Hard => (card.state, card.lapses),
                    Rating::Good | Rating::Easy => (LearningState::Review, card.lapses),
                };
                (
                    next_state,
                    initial_stability(w, rating),
                    next_difficulty(w, card.difficulty, rating),
                    lapses,
                )
            }
            LearningState::Review => {
                let r = retrievability(card.stability, f64::from(elapsed_days));
                let difficulty = next_difficulty(w, card.difficulty, rating);
                match rating {
                    Rating::Again => (
                        LearningState::Relearning,
                        next_forget_stability(w, card.difficulty, card.stability, r)
                            .max(MIN_STABILITY),
                        difficulty,
                        increment(card.lapses, "lapses")?,
                    ),
                    Rating::Hard | Rating::Good | Rating::Easy => (
                        LearningState::Review,
                        next_recall_stability(w, card.difficulty, card.stability, r, rating)
                            .max(MIN_STABILITY),
                        difficulty,
                        card.lapses,
                    ),
                }
            }
        };

        let scheduled_days = self.interval_for(next_state, rating, stability);
        let due = now
            .checked_add_signed(Duration::days(i64::from(scheduled_days)))
            .ok_or_else(|| {
                CadenceError::InvalidArgument(format!(
                    "due date {} days after {} is out of range",
                    scheduled_days, now
                ))
            })?;
        let reps = increment(card.reps, "reps")?;

        tracing::debug!(
            from = %card.state,
            to = %next_state,
            rating = %rating,
            elapsed_days,
            scheduled_days,
            stability,
            difficulty,
            "Scheduled review"
        );

        let next = FSRSState {
            stability,
            difficulty,
            elapsed_days,
            scheduled_days,
            reps,
            lapses,
            state: next_state,
            last_review: Some(now),
            due,
        };

        let log = ReviewLog {
            rating,
            scheduled_days,
            elapsed_days,
            state_before: card.state,
            stability,
            difficulty,
            stability_before: card.stability,
            difficulty_before: card.difficulty,
            reviewed_at: now,
        };

        Ok(ReviewResult { card: next, log })
    }

    /// Probability of recall right now.
    ///
    /// New items and items never reviewed report 1.0.
    pub fn current_retrievability(&self, card: &FSRSState, now: DateTime<Utc>) -> f64 {
        if card.state == LearningState::New || card.last_review.is_none() {
            return 1.0;
        }
        retrievability(card.stability, f64::from(card.elapsed_days_at(now)))
    }

    fn interval_for(&self, next_state: LearningState, rating: Rating, stability: f64) -> u32 {
        if next_state.is_learning_phase() {
            match rating {
                Rating::Again | Rating::Hard => 0,
                Rating::Good => 1,
                // Unreachable from schedule: Easy always graduates to Review
                Rating::Easy => stability.round().max(1.0) as u32,
            }
        } else {
            next_interval(
                stability,
                self.params.request_retention,
                self.params.maximum_interval,
            )
        }
    }
}

fn increment(count: u32, name: &str) -> Result<u32> {
    count.checked_add(1).ok_or_else(|| {
        CadenceError::InvalidArgument(format!("{} counter cannot grow past {}", name, u32::MAX))
    })
}

// ============================================================================
// TESTS
// ============================================================================
