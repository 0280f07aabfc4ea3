//! Utilities shared between the Wayfare binaries and tests.

pub mod logger;
pub mod time;
