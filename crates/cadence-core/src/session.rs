//! Review Sessions
//!
//! Two read-only utilities built on the card model:
//!
//! - **Prioritizer** ([`sort_by_priority`]): a stable ordering for a review
//!   queue. Never touches the scheduler.
//! - **Composition policy** ([`SessionPolicy`]): decides which cards make up a
//!   session. Learning and relearning cards first, then due reviews, then as
//!   many new cards as the backlog leaves room for.
//!
//! Card storage sits behind [`CardSource`], so the same policy can run against
//! an in-memory slice or a database-backed source.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::Card;
use crate::fsrs::LearningState;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default cap on new cards per session
pub const DEFAULT_NEW_CARDS_LIMIT: usize = 10;

/// Default cap on due review cards per session
pub const DEFAULT_REVIEW_LIMIT: usize = 100;

/// Every this many backlog cards cost one new-card slot
const BACKLOG_PER_NEW_CARD: usize = 10;

// ============================================================================
// PRIORITIZER
// ============================================================================

/// Queue rank of a learning state, lower first
fn state_priority(state: LearningState) -> u8 {
    match state {
        LearningState::Relearning => 0,
        LearningState::Learning => 1,
        LearningState::Review => 2,
        LearningState::New => 3,
    }
}

/// Order cards for a review queue.
///
/// Precedence: non-suspended before suspended, overdue before not, then
/// Relearning < Learning < Review < New, then ascending due. The sort is
/// stable, so cards equal on every key keep their input order.
pub fn sort_by_priority(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    let mut ordered = cards.to_vec();
    ordered.sort_by_key(|card| {
        (
            card.is_suspended,
            !card.is_overdue(now),
            state_priority(card.state()),
            card.due(),
        )
    });
    ordered
}

// ============================================================================
// REQUEST
// ============================================================================

/// Scope and limits for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRequest {
    /// Restrict to one deck, or None for every deck
    pub deck_id: Option<Uuid>,
    /// Upper bound on new cards
    pub new_cards_limit: usize,
    /// Upper bound on due review cards
    pub review_limit: usize,
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self {
            deck_id: None,
            new_cards_limit: DEFAULT_NEW_CARDS_LIMIT,
            review_limit: DEFAULT_REVIEW_LIMIT,
        }
    }
}

impl SessionRequest {
    /// Limit the session to one deck
    pub fn for_deck(mut self, deck_id: Uuid) -> Self {
        self.deck_id = Some(deck_id);
        self
    }

    /// Override the new-card cap
    pub fn with_new_cards_limit(mut self, limit: usize) -> Self {
        self.new_cards_limit = limit;
        self
    }

    /// Override the review cap
    pub fn with_review_limit(mut self, limit: usize) -> Self {
        self.review_limit = limit;
        self
    }

    /// New cards to fetch once the backlog is known
    pub fn new_cards_to_fetch(&self, learning_count: usize, due_count: usize) -> usize {
        self.new_cards_limit
            .saturating_sub((learning_count + due_count) / BACKLOG_PER_NEW_CARD)
    }
}

// ============================================================================
// CARD SOURCE
// ============================================================================

/// Where a session policy pulls its candidate cards from.
///
/// Every query excludes suspended cards and honours the deck scope.
pub trait CardSource {
    /// Learning and Relearning cards, ascending due, uncapped
    fn learning_cards(&self, deck_id: Option<Uuid>) -> Vec<Card>;

    /// Review cards due at or before `now`, ascending due, at most `limit`
    fn due_cards(&self, deck_id: Option<Uuid>, now: DateTime<Utc>, limit: usize) -> Vec<Card>;

    /// New cards, oldest first, at most `limit`
    fn new_cards(&self, deck_id: Option<Uuid>, limit: usize) -> Vec<Card>;
}

impl CardSource for [Card] {
    fn learning_cards(&self, deck_id: Option<Uuid>) -> Vec<Card> {
        let mut cards = select(self, deck_id, |c| c.state().is_learning_phase());
        cards.sort_by_key(Card::due);
        cards
    }

    fn due_cards(&self, deck_id: Option<Uuid>, now: DateTime<Utc>, limit: usize) -> Vec<Card> {
        let mut cards = select(self, deck_id, |c| {
            c.state() == LearningState::Review && c.due() <= now
        });
        cards.sort_by_key(Card::due);
        cards.truncate(limit);
        cards
    }

    fn new_cards(&self, deck_id: Option<Uuid>, limit: usize) -> Vec<Card> {
        let mut cards = select(self, deck_id, |c| c.state() == LearningState::New);
        cards.sort_by_key(|c| c.created_at);
        cards.truncate(limit);
        cards
    }
}

impl CardSource for Vec<Card> {
    fn learning_cards(&self, deck_id: Option<Uuid>) -> Vec<Card> {
        self.as_slice().learning_cards(deck_id)
    }

    fn due_cards(&self, deck_id: Option<Uuid>, now: DateTime<Utc>, limit: usize) -> Vec<Card> {
        self.as_slice().due_cards(deck_id, now, limit)
    }

    fn new_cards(&self, deck_id: Option<Uuid>, limit: usize) -> Vec<Card> {
        self.as_slice().new_cards(deck_id, limit)
    }
}

fn select(cards: &[Card], deck_id: Option<Uuid>, keep: impl Fn(&Card) -> bool) -> Vec<Card> {
    cards
        .iter()
        .filter(|c| !c.is_suspended)
        .filter(|c| deck_id.is_none_or(|deck| c.deck_id == deck))
        .filter(|&c| keep(c))
        .cloned()
        .collect()
}

// ============================================================================
// COMPOSITION POLICY
// ============================================================================

/// Chooses the cards that make up one review session
pub trait SessionPolicy: Send + Sync {
    /// Assemble the session, in presentation order, without duplicates
    fn compose(
        &self,
        source: &dyn CardSource,
        request: &SessionRequest,
        now: DateTime<Utc>,
    ) -> Vec<Card>;
}

/// Learning, then due reviews, then new cards shrunk by the backlog
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSessionPolicy;

impl SessionPolicy for DefaultSessionPolicy {
    fn compose(
        &self,
        source: &dyn CardSource,
        request: &SessionRequest,
        now: DateTime<Utc>,
    ) -> Vec<Card> {
        let learning = source.learning_cards(request.deck_id);
        let due = source.due_cards(request.deck_id, now, request.review_limit);

        let new_to_fetch = request.new_cards_to_fetch(learning.len(), due.len());
        let new = if new_to_fetch > 0 {
            source.new_cards(request.deck_id, new_to_fetch)
        } else {
            Vec::new()
        };

        tracing::debug!(
            learning = learning.len(),
            due = due.len(),
            new = new.len(),
            new_to_fetch,
            "Composed session"
        );

        dedup_by_id(learning.into_iter().chain(due).chain(new))
    }
}

/// Keep the first occurrence of each card id
fn dedup_by_id(cards: impl IntoIterator<Item = Card>) -> Vec<Card> {
    let mut seen = HashSet::new();
    cards.into_iter().filter(|c| seen.insert(c.id)).collect()
}

// ============================================================================
// TESTS
// ============================================================================
