//! Scheduler invariants over random snapshots

use cadence_core::fsrs::{MAX_DIFFICULTY, MIN_DIFFICULTY, MIN_STABILITY};
use cadence_core::{FSRSParameters, FSRSScheduler, FSRSState, LearningState, Rating, retrievability};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn rating() -> impl Strategy<Value = Rating> {
    prop::sample::select(Rating::ALL.to_vec())
}

fn reviewed_state() -> impl Strategy<Value = LearningState> {
    prop::sample::select(vec![
        LearningState::Learning,
        LearningState::Review,
        LearningState::Relearning,
    ])
}

/// A snapshot that some sequence of reviews could have produced
fn snapshot() -> impl Strategy<Value = (FSRSState, i64)> {
    (
        reviewed_state(),
        0.1f64..50_000.0,
        1.0f64..=10.0,
        0u32..500,
        0u32..50,
        0i64..3_650,
    )
        .prop_map(|(state, stability, difficulty, reps, lapses, elapsed)| {
            let card = FSRSState {
                stability,
                difficulty,
                elapsed_days: 0,
                scheduled_days: 1,
                reps,
                lapses,
                state,
                last_review: Some(t0()),
                due: t0() + Duration::days(1),
            };
            (card, elapsed)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn schedule_output_is_bounded((card, elapsed) in snapshot(), rating in rating()) {
        let scheduler = FSRSScheduler::default();
        let now = t0() + Duration::days(elapsed);
        let result = scheduler.schedule(&card, rating, now).unwrap();
        let next = &result.card;

        prop_assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&next.difficulty));
        prop_assert!(next.stability >= MIN_STABILITY);
        prop_assert!(next.stability.is_finite());
        prop_assert!(next.scheduled_days <= scheduler.params().maximum_interval);
        prop_assert_eq!(next.reps, card.reps + 1);
        prop_assert_eq!(next.last_review, Some(now));
        prop_assert_eq!(next.due, now + Duration::days(i64::from(next.scheduled_days)));
        prop_assert!(next.validate().is_ok());
    }

    #[test]
    fn review_again_always_lapses((mut card, elapsed) in snapshot()) {
        card.state = LearningState::Review;
        let scheduler = FSRSScheduler::default();
        let result = scheduler
            .schedule(&card, Rating::Again, t0() + Duration::days(elapsed))
            .unwrap();

        prop_assert_eq!(result.card.state, LearningState::Relearning);
        prop_assert_eq!(result.card.lapses, card.lapses + 1);
        prop_assert_eq!(result.card.scheduled_days, 0);
    }

    #[test]
    fn lapses_only_grow_on_again((card, elapsed) in snapshot(), rating in rating()) {
        let scheduler = FSRSScheduler::default();
        let result = scheduler
            .schedule(&card, rating, t0() + Duration::days(elapsed))
            .unwrap();

        if rating == Rating::Again && card.state != LearningState::Learning {
            prop_assert_eq!(result.card.lapses, card.lapses + 1);
        } else {
            prop_assert_eq!(result.card.lapses, card.lapses);
        }
    }

    #[test]
    fn easy_never_schedules_sooner_than_good_in_review((mut card, elapsed) in snapshot()) {
        card.state = LearningState::Review;
        let scheduler = FSRSScheduler::default();
        let preview = scheduler.preview(&card, t0() + Duration::days(elapsed)).unwrap();

        prop_assert!(preview.easy.card.scheduled_days >= preview.good.card.scheduled_days);
        prop_assert!(preview.good.card.scheduled_days >= preview.hard.card.scheduled_days);
    }

    #[test]
    fn preview_shares_state_before_and_is_idempotent((card, elapsed) in snapshot()) {
        let scheduler = FSRSScheduler::default();
        let now = t0() + Duration::days(elapsed);
        let first = scheduler.preview(&card, now).unwrap();
        let second = scheduler.preview(&card, now).unwrap();

        for (_, result) in first.iter() {
            prop_assert_eq!(result.log.state_before, card.state);
        }
        prop_assert_eq!(first, second);
    }

    #[test]
    fn first_review_is_independent_of_elapsed_time(rating in rating(), days in 0i64..10_000) {
        let scheduler = FSRSScheduler::default();
        let card = FSRSState::new(t0());
        let now = t0() + Duration::days(days);
        let result = scheduler.schedule(&card, rating, now).unwrap();
        let baseline = scheduler.schedule(&card, rating, t0()).unwrap();

        prop_assert_eq!(result.card.stability, baseline.card.stability);
        prop_assert_eq!(result.card.difficulty, baseline.card.difficulty);
        prop_assert_eq!(result.card.scheduled_days, baseline.card.scheduled_days);
        prop_assert_eq!(result.card.elapsed_days, 0);
    }

    #[test]
    fn retrievability_is_one_at_zero_and_non_increasing(
        stability in 0.001f64..1e9,
        t in 0u32..100_000,
        dt in 1u32..10_000,
    ) {
        prop_assert_eq!(retrievability(stability, 0.0), 1.0);
        prop_assert!(retrievability(stability, f64::from(t + dt)) <= retrievability(stability, f64::from(t)));
    }

    #[test]
    fn maximum_interval_is_respected(max in 1u32..400, (mut card, elapsed) in snapshot()) {
        card.state = LearningState::Review;
        let params = FSRSParameters::default().with_maximum_interval(max);
        let scheduler = FSRSScheduler::new(params).unwrap();
        let preview = scheduler.preview(&card, t0() + Duration::days(elapsed)).unwrap();

        for (_, result) in preview.iter() {
            prop_assert!(result.card.scheduled_days <= max);
        }
    }

    #[test]
    fn raw_ratings_outside_range_are_rejected(value in 5u8..=255) {
        let scheduler = FSRSScheduler::default();
        prop_assert!(scheduler.review(&FSRSState::new(t0()), value, t0()).is_err());
        prop_assert!(scheduler.review(&FSRSState::new(t0()), 0, t0()).is_err());
    }
}
