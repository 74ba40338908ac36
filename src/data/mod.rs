//! Data module - CSV loading and cleaning

mod loader;
mod processor;
mod record;

pub use loader::{DataLoader, LoaderError};
pub use processor::{CleanError, CleanStats, DataProcessor};
#[cfg(test)]
pub use record::OrderRecord;
pub use record::Season;
