//! fintrack-storage-sqlite: rusqlite-backed implementation of the core
//! `LocalStore` contract.

pub mod db;
pub mod errors;
pub mod store;

pub use errors::StorageError;
pub use store::SqliteStore;
