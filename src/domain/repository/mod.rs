pub mod sql_store;
pub mod wire;

pub use sql_store::{SqlStore, StoreError};
#[cfg(test)]
pub use sql_store::MockSqlStore;
pub use wire::{QueryReply, WireColumn, WireRow, WireValue};
