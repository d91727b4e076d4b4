//! Storage primitives shared by the infrastructure layer.

pub mod atomic_json;

pub use atomic_json::{AtomicJsonFile, repair_trailing_separators};
