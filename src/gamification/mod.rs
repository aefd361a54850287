//! Points, streaks, levels, achievements and daily challenges.
//!
//! Everything except [`engine::Gamification`] is a pure function of the task
//! list and the current date.

pub mod achievements;
pub mod activity;
pub mod challenge;
pub mod engine;
pub mod levels;
pub mod points;

pub use engine::{AwardOutcome, Gamification};
