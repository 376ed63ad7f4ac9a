pub mod aggregate;
pub mod classify;
pub mod engine;
pub mod filter;
pub mod watch;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{ScanEngine, ScanResult};
