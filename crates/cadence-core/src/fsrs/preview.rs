//! Rating previews
//!
//! Runs the scheduler once per rating against the same untouched snapshot so
//! a review screen can show what each button would do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scheduler::{FSRSScheduler, FSRSState, Rating, ReviewResult};
use crate::error::Result;

/// Scheduling outcome for every rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResults {
    pub again: ReviewResult,
    pub hard: ReviewResult,
    pub good: ReviewResult,
    pub easy: ReviewResult,
}

impl PreviewResults {
    /// Outcome for one rating
    pub fn get(&self, rating: Rating) -> &ReviewResult {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }

    /// Iterate (rating, outcome) pairs from Again to Easy
    pub fn iter(&self) -> impl Iterator<Item = (Rating, &ReviewResult)> {
        Rating::ALL.into_iter().map(move |rating| (rating, self.get(rating)))
    }

    /// Interval and label per rating
    pub fn intervals(&self) -> PreviewIntervals {
        PreviewIntervals {
            again: IntervalPreview::from_days(self.again.card.scheduled_days),
            hard: IntervalPreview::from_days(self.hard.card.scheduled_days),
            good: IntervalPreview::from_days(self.good.card.scheduled_days),
            easy: IntervalPreview::from_days(self.easy.card.scheduled_days),
        }
    }
}

/// Interval shown on a rating button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalPreview {
    /// Scheduled days
    pub interval: u32,
    /// Human-readable interval
    pub label: String,
}

impl IntervalPreview {
    fn from_days(days: u32) -> Self {
        Self {
            interval: days,
            label: format_interval(days),
        }
    }
}

/// Interval previews for every rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewIntervals {
    pub again: IntervalPreview,
    pub hard: IntervalPreview,
    pub good: IntervalPreview,
    pub easy: IntervalPreview,
}

impl FSRSScheduler {
    /// Schedule the snapshot under each rating without mutating it
    pub fn preview(&self, card: &FSRSState, now: DateTime<Utc>) -> Result<PreviewResults> {
        let results = PreviewResults {
            again: self.schedule(card, Rating::Again, now)?,
            hard: self.schedule(card, Rating::Hard, now)?,
            good: self.schedule(card, Rating::Good, now)?,
            easy: self.schedule(card, Rating::Easy, now)?,
        };

        tracing::trace!(
            state = %card.state,
            again = results.again.card.scheduled_days,
            hard = results.hard.card.scheduled_days,
            good = results.good.card.scheduled_days,
            easy = results.easy.card.scheduled_days,
            "Generated preview"
        );

        Ok(results)
    }

    /// Interval and label per rating
    pub fn preview_intervals(
        &self,
        card: &FSRSState,
        now: DateTime<Utc>,
    ) -> Result<PreviewIntervals> {
        Ok(self.preview(card, now)?.intervals())
    }
}

/// Format an interval in days for display.
///
/// `0 -> "Now"`, then days, weeks, months and years with singular forms.
pub fn format_interval(days: u32) -> String {
    fn unit(count: u32, singular: &str) -> String {
        if count == 1 {
            format!("1 {}", singular)
        } else {
            format!("{} {}s", count, singular)
        }
    }

    let d = f64::from(days);
    match days {
        0 => "Now".to_string(),
        1..7 => unit(days, "day"),
        7..30 => unit((d / 7.0).round() as u32, "week"),
        30..365 => unit((d / 30.0).round() as u32, "month"),
        _ => unit((d / 365.0).round() as u32, "year"),
    }
}

// ============================================================================
// TESTS
// ============================================================================
