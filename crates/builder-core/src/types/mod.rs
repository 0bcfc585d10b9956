//! Shared types used across builder crates.

pub mod id;

pub use id::BuildId;
