//! # Cadence Core
//!
//! Spaced-repetition scheduling engine built on the FSRS-4.5 memory model.
//!
//! - **FSRS-4.5**: 19-weight model of stability, difficulty and retrievability
//! - **State machine**: New, Learning, Review and Relearning with lapse tracking
//! - **Previews**: the outcome of every rating, for rating buttons
//! - **Sessions**: queue prioritization and a swappable composition policy
//!
//! The engine performs no I/O. Callers hold card snapshots, hand them to the
//! scheduler with a rating and a timestamp, and persist the returned snapshot
//! and review log together.
//!
//! ## Quick Start
//!
//! ```rust
//! use cadence_core::{FSRSScheduler, FSRSState, LearningState, Rating};
//! use chrono::Utc;
//!
//! let scheduler = FSRSScheduler::default();
//! let now = Utc::now();
//!
//! let card = FSRSState::new(now);
//! let result = scheduler.schedule(&card, Rating::Good, now)?;
//!
//! assert_eq!(result.card.state, LearningState::Review);
//! assert_eq!(result.card.scheduled_days, 1);
//!
//! let preview = scheduler.preview_intervals(&result.card, now)?;
//! println!("Again: {}, Easy: {}", preview.again.label, preview.easy.label);
//! # Ok::<(), cadence_core::CadenceError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod card;
pub mod error;
pub mod fsrs;
pub mod session;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Errors
pub use error::{CadenceError, Result};

// FSRS-4.5 algorithm
pub use fsrs::{
    format_interval,
    initial_difficulty,
    initial_stability,
    next_interval,
    // Core functions for advanced usage
    retrievability,
    FSRSParameters,
    FSRSScheduler,
    FSRSState,
    IntervalPreview,
    LearningState,
    PreviewIntervals,
    PreviewResults,
    Rating,
    ReviewLog,
    ReviewResult,
};

// Cards
pub use card::Card;

// Sessions
pub use session::{
    sort_by_priority, CardSource, DefaultSessionPolicy, SessionPolicy, SessionRequest,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FSRS algorithm version (4.5 = 19 weights)
pub const FSRS_VERSION: &str = "4.5";

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        CadenceError, Card, DefaultSessionPolicy, FSRSParameters, FSRSScheduler, FSRSState,
        LearningState, Rating, Result, ReviewLog, ReviewResult, SessionPolicy, SessionRequest,
        sort_by_priority,
    };
}
