//! Test fixtures

mod fixtures;

pub use fixtures::{BatchConfig, CardFactory, TestScenario};
