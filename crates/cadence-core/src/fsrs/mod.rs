//! FSRS-4.5 (Free Spaced Repetition Scheduler) Module
//!
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! ## Core Formulas:
//! - Retrievability: R = (1 + t / (9 S))^-1
//! - Interval: t = S / 9 * (1 / R_target - 1), rounded and clamped
//!
//! ## State machine:
//! - New -> Learning (Again, Hard) or Review (Good, Easy)
//! - Learning / Relearning -> Review on Good or Easy
//! - Review -> Relearning on Again, a lapse

mod algorithm;
mod parameters;
mod preview;
mod scheduler;

pub use algorithm::{
    initial_difficulty,
    initial_stability,
    mean_reversion,
    next_difficulty,
    next_forget_stability,
    next_interval,
    next_recall_stability,
    // Core functions
    retrievability,
    // Constants
    MAX_DIFFICULTY,
    MIN_DIFFICULTY,
    MIN_STABILITY,
};

pub use parameters::{
    DEFAULT_MAXIMUM_INTERVAL, DEFAULT_RETENTION, FSRS45_WEIGHTS, FSRSParameters,
    MAX_MAXIMUM_INTERVAL, WEIGHT_COUNT,
};

pub use preview::{IntervalPreview, PreviewIntervals, PreviewResults, format_interval};

pub use scheduler::{
    FSRSScheduler, FSRSState, LearningState, Rating, ReviewLog, ReviewResult,
};
