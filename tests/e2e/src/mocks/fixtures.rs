//! Test Data Factory
//!
//! Provides utilities for generating realistic test cards:
//! - Cards in any learning state with consistent scheduling snapshots
//! - Batch generation for queue and ordering tests
//! - Pre-built scenarios for common session shapes

use std::collections::HashMap;

use cadence_core::{Card, FSRSState, LearningState};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Factory for creating test cards
///
/// Every card it builds passes `FSRSState::validate`, so it can be fed to
/// the scheduler as well as to the session utilities.
///
/// # Example
///
/// ```rust,ignore
/// let deck = Uuid::new_v4();
///
/// // Create a single card
/// let card = CardFactory::create_in_state(deck, LearningState::Review, now, now);
///
/// // Create a batch
/// let cards = CardFactory::create_batch(deck, 100, now);
///
/// // Create a specific scenario
/// let scenario = CardFactory::create_backlog_scenario(deck, now);
/// ```
pub struct CardFactory;

/// Configuration for batch card generation
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of cards to create
    pub count: usize,
    /// Deck to place cards in
    pub deck_id: Uuid,
    /// State to use (None = cycle through all four)
    pub state: Option<LearningState>,
    /// Suspend every n-th card (None = no suspensions)
    pub suspend_every: Option<usize>,
    /// Due times spread this many hours either side of `now`
    pub due_spread_hours: i64,
    /// Front text prefix
    pub front_prefix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 10,
            deck_id: Uuid::new_v4(),
            state: None,
            suspend_every: None,
            due_spread_hours: 48,
            front_prefix: "Test card".to_string(),
        }
    }
}

/// Scenario containing related test cards
#[derive(Debug)]
pub struct TestScenario {
    /// Cards in the scenario
    pub cards: Vec<Card>,
    /// Description of the scenario
    pub description: String,
    /// Named card ids for assertions
    pub metadata: HashMap<String, Uuid>,
}

impl CardFactory {
    // ========================================================================
    // SINGLE CARD CREATION
    // ========================================================================

    /// Create a never-reviewed card
    pub fn create_new(deck_id: Uuid, front: &str, created_at: DateTime<Utc>) -> Card {
        Card::new(deck_id, front, format!("answer to {}", front), created_at)
    }

    /// Create a card in `state` that falls due at `due`
    pub fn create_in_state(
        deck_id: Uuid,
        state: LearningState,
        due: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Card {
        let mut card = Self::create_new(deck_id, &format!("{} card", state), now - Duration::days(60));
        card.scheduling = Self::scheduling_for(state, due);
        card
    }

    /// Create a Review card with explicit memory values
    pub fn create_review(
        deck_id: Uuid,
        stability: f64,
        difficulty: f64,
        last_review: DateTime<Utc>,
    ) -> Card {
        let mut card = Self::create_new(deck_id, "review card", last_review - Duration::days(30));
        card.scheduling = FSRSState {
            stability,
            difficulty,
            elapsed_days: 0,
            scheduled_days: 1,
            reps: 5,
            lapses: 0,
            state: LearningState::Review,
            last_review: Some(last_review),
            due: last_review + Duration::days(1),
        };
        card
    }

    /// Plausible snapshot for a state
    pub fn scheduling_for(state: LearningState, due: DateTime<Utc>) -> FSRSState {
        if state == LearningState::New {
            return FSRSState::new(due);
        }

        let (stability, difficulty, reps, lapses) = match state {
            LearningState::Learning => (1.1829, 6.5, 1, 0),
            LearningState::Relearning => (2.0, 7.4, 6, 1),
            _ => (12.0, 5.3, 4, 0),
        };

        FSRSState {
            stability,
            difficulty,
            elapsed_days: 0,
            scheduled_days: 1,
            reps,
            lapses,
            state,
            last_review: Some(due - Duration::days(1)),
            due,
        }
    }

    // ========================================================================
    // BATCH CREATION
    // ========================================================================

    /// Create a batch of cards
    pub fn create_batch(deck_id: Uuid, count: usize, now: DateTime<Utc>) -> Vec<Card> {
        Self::create_batch_with_config(
            BatchConfig {
                count,
                deck_id,
                ..Default::default()
            },
            now,
        )
    }

    /// Create a batch with custom configuration
    pub fn create_batch_with_config(config: BatchConfig, now: DateTime<Utc>) -> Vec<Card> {
        let states = [
            LearningState::New,
            LearningState::Learning,
            LearningState::Review,
            LearningState::Relearning,
        ];
        let spread = config.due_spread_hours.max(1);

        (0..config.count)
            .map(|i| {
                let state = config.state.unwrap_or(states[i % states.len()]);
                // Deterministic spread over [-spread, spread) hours
                let offset = (i as i64 * 37) % (2 * spread) - spread;
                let due = now + Duration::hours(offset);

                let mut card = Self::create_in_state(config.deck_id, state, due, now);
                card.front = format!("{} {}", config.front_prefix, i);
                card.created_at = now - Duration::days(60) + Duration::minutes(i as i64);
                card.is_suspended = config
                    .suspend_every
                    .is_some_and(|n| n > 0 && i % n == n - 1);
                card
            })
            .collect()
    }

    // ========================================================================
    // SCENARIO CREATION
    // ========================================================================

    /// One card per queue position, in expected priority order
    pub fn create_priority_scenario(deck_id: Uuid, now: DateTime<Utc>) -> TestScenario {
        let mut metadata = HashMap::new();
        let mut cards = Vec::new();

        let mut push = |name: &str, card: Card| {
            metadata.insert(name.to_string(), card.id);
            cards.push(card);
        };

        let mut suspended =
            Self::create_in_state(deck_id, LearningState::Relearning, now - Duration::days(9), now);
        suspended.is_suspended = true;
        push("suspended", suspended);

        push(
            "upcoming_new",
            Self::create_in_state(deck_id, LearningState::New, now + Duration::hours(1), now),
        );
        push(
            "overdue_new",
            Self::create_in_state(deck_id, LearningState::New, now - Duration::hours(1), now),
        );
        push(
            "overdue_review",
            Self::create_in_state(deck_id, LearningState::Review, now - Duration::hours(5), now),
        );
        push(
            "overdue_learning",
            Self::create_in_state(deck_id, LearningState::Learning, now - Duration::hours(2), now),
        );
        push(
            "overdue_relearning",
            Self::create_in_state(deck_id, LearningState::Relearning, now - Duration::hours(1), now),
        );
        push(
            "upcoming_relearning",
            Self::create_in_state(deck_id, LearningState::Relearning, now + Duration::hours(3), now),
        );

        TestScenario {
            cards,
            description: "Every precedence level of the queue ordering".to_string(),
            metadata,
        }
    }

    /// A due backlog large enough to squeeze new cards
    pub fn create_backlog_scenario(
        deck_id: Uuid,
        learning: usize,
        due: usize,
        new: usize,
        now: DateTime<Utc>,
    ) -> TestScenario {
        let mut cards = Vec::with_capacity(learning + due + new);

        for i in 0..learning {
            cards.push(Self::create_in_state(
                deck_id,
                LearningState::Learning,
                now + Duration::minutes(10 * i as i64),
                now,
            ));
        }
        for i in 0..due {
            cards.push(Self::create_in_state(
                deck_id,
                LearningState::Review,
                now - Duration::hours(1 + i as i64),
                now,
            ));
        }
        for i in 0..new {
            let mut card = Self::create_new(deck_id, &format!("new {}", i), now);
            card.created_at = now - Duration::days(30) + Duration::hours(i as i64);
            cards.push(card);
        }

        let mut metadata = HashMap::new();
        if let Some(card) = cards.get(learning + due) {
            metadata.insert("oldest_new".to_string(), card.id);
        }

        TestScenario {
            cards,
            description: format!("{} learning, {} due, {} new", learning, due, new),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_fixture_snapshots_validate() {
        let cards = CardFactory::create_batch(Uuid::new_v4(), 40, t0());
        assert_eq!(cards.len(), 40);
        for card in &cards {
            assert!(card.scheduling.validate().is_ok());
        }
    }

    #[test]
    fn test_suspend_every() {
        let cards = CardFactory::create_batch_with_config(
            BatchConfig {
                count: 9,
                suspend_every: Some(3),
                ..Default::default()
            },
            t0(),
        );
        assert_eq!(cards.iter().filter(|c| c.is_suspended).count(), 3);
    }
}
