//! Boards of kanban columns and tasks, with a scoring layer on top.
//!
//! - [`model`]: plain records (boards, columns, tasks, gamification state, config)
//! - [`ops`]: board/column/task mutations that keep the column index consistent
//! - [`gamification`]: points, streaks, levels, achievements and daily challenges
//! - [`io`]: storage backends and the JSON load/save contracts
//! - [`session`]: the top-level controller that ties the pieces together

pub mod auth;
pub mod gamification;
pub mod io;
pub mod model;
pub mod ops;
pub mod pomodoro;
pub mod session;
pub mod util;
