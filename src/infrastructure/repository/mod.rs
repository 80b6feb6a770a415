pub mod memory_store;

pub use memory_store::{MemoryStore, DEFAULT_PASSWORD, DEFAULT_USER};
