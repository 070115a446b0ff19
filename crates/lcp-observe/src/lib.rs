//! Logging setup shared by multi-tile binaries.

mod logger;
pub use logger::*;
