//! Record shredding
//!
//! Turns nested JSON records into per-leaf column streams of
//! `(value, repetition level, definition level)` entries.

mod errors;
mod shredder;

pub use errors::{ShredError, ShredErrorCode, ShredResult};
pub use shredder::Shredder;
