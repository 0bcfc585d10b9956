//! # builder-core
//!
//! Core crate for the builder. Contains the configuration schema,
//! typed identifiers, builder domain events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other builder crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
