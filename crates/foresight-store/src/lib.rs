//! # foresight-store
//!
//! The foresight pool, the daily assignment store, and its persistence.

pub mod adapter;
pub mod day;
pub mod pool;
pub mod service;
pub mod snapshot;
pub mod store;

pub use adapter::{JsonFileAdapter, MemoryAdapter, SnapshotAdapter};
pub use day::DayKey;
pub use pool::ForesightPool;
pub use service::ForesightService;
pub use snapshot::PersistedSnapshot;
pub use store::{AssignmentStore, UserId};
