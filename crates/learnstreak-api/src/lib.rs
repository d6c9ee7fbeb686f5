//! Domain types for learnstreak
//!
//! This crate defines the data shared between the streak store and the
//! code that embeds it:
//! - Goals, durations and day statuses
//! - `AppData`, the canonical snapshot
//! - Events emitted to listeners
//! - The persisted byte format (encode/decode)

mod codec;
mod events;
mod types;

pub use codec::*;
pub use events::*;
pub use types::*;

/// Current persisted data format version
pub const DATA_FORMAT_VERSION: u32 = 1;
