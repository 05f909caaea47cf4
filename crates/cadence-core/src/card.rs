//! Card - the caller-facing view of one learning item
//!
//! Bundles identity, deck membership and the suspension flag with the
//! scheduling snapshot. Persisting cards is the caller's job; this type only
//! gives the session utilities something to order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fsrs::{FSRSScheduler, FSRSState, LearningState, ReviewLog, ReviewResult};

/// A flashcard with its scheduling snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Card identity, used for de-duplication
    pub id: Uuid,
    /// Owning deck
    pub deck_id: Uuid,
    /// Prompt side
    #[serde(default)]
    pub front: String,
    /// Answer side
    #[serde(default)]
    pub back: String,
    /// Suspended cards never enter a session
    #[serde(default)]
    pub is_suspended: bool,
    /// Creation time, orders New cards
    pub created_at: DateTime<Utc>,
    /// FSRS scheduling snapshot
    #[serde(flatten)]
    pub scheduling: FSRSState,
}

impl Card {
    /// Create a never-reviewed card, due immediately
    pub fn new(
        deck_id: Uuid,
        front: impl Into<String>,
        back: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front: front.into(),
            back: back.into(),
            is_suspended: false,
            created_at: now,
            scheduling: FSRSState::new(now),
        }
    }

    /// Learning state
    #[inline]
    pub fn state(&self) -> LearningState {
        self.scheduling.state
    }

    /// Due time
    #[inline]
    pub fn due(&self) -> DateTime<Utc> {
        self.scheduling.due
    }

    /// Eligible for review: not suspended and due at or before `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.is_suspended && self.scheduling.due <= now
    }

    /// Overdue: strictly past its due time
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.scheduling.due < now
    }

    /// Current probability of recall
    pub fn retrievability(&self, scheduler: &FSRSScheduler, now: DateTime<Utc>) -> f64 {
        scheduler.current_retrievability(&self.scheduling, now)
    }

    /// Replace the snapshot with a schedule outcome and hand back the log.
    ///
    /// The caller persists the card and the log together.
    pub fn apply(&mut self, result: ReviewResult) -> ReviewLog {
        self.scheduling = result.card;
        result.log
    }
}

// ============================================================================
// TESTS
// ============================================================================
