//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod contract;
pub mod units;

pub use contract::*;
pub use units::*;
