pub mod memory;

pub use memory::{MemoryStorage, ScriptError, StorageError};
