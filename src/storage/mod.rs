//! Storage abstraction layer.
//!
//! The pipeline talks to object storage only through the [`ObjectStore`]
//! trait. Two backends are provided: an in-memory store and a store that maps
//! buckets onto directories.

pub mod file;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use file::*;
pub use memory::*;
pub use traits::*;
