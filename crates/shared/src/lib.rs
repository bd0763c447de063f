//! Shared types, errors, and configuration for Farebox.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Rounding helpers for settlement comparisons
//! - Loyalty program codes and account normalization
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{AppError, AppResult};
