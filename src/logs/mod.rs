//! Extraction of the `show` JSON array from build tool logs.

pub mod exchange;
pub mod extractor;

pub use exchange::{DataExchange, JsonLinesExchange, MemoryExchange};
pub use extractor::{extract, publish_log};
