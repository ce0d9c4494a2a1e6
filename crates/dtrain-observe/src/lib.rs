//! Process-wide logging setup for the launcher binary.
mod logger;
pub use logger::*;
