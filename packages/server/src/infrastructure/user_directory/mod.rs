//! User directory implementations.
//!
//! - `inmemory`: a fixed set of profiles, optionally loaded from a JSON file
//! - `http`: the surrounding application's user API

pub mod http;
pub mod inmemory;

pub use http::HttpUserDirectory;
pub use inmemory::InMemoryUserDirectory;
