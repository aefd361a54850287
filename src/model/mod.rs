pub mod board;
pub mod config;
pub mod gamification;
pub mod task;
pub mod user;

pub use board::*;
pub use config::*;
pub use gamification::*;
pub use task::*;
pub use user::*;
