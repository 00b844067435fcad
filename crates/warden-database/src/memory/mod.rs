//! In-memory store for single-node deployments and tests.

pub mod store;

pub use store::MemoryDatabase;
