//! Common types used across the application.

pub mod id;
pub mod money;
pub mod points;

pub use id::*;
pub use money::{round_money, round_whole, rounds_equal};
pub use points::LoyaltyProgram;
