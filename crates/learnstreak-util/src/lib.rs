//! Shared utilities for learnstreak
//!
//! This crate provides:
//! - Calendar-day time helpers (start-of-day normalization, timestamps)
//! - Clocks (system time with mock support, fixed time for tests)
//! - Error types
//! - Default paths for data and config files
//! - Logging setup

mod error;
mod logging;
mod paths;
mod time;

pub use error::*;
pub use logging::*;
pub use paths::*;
pub use time::*;
