//! Shared-mutable in-memory relations. Each structure carries its own
//! read/write lock; readers run concurrently, writers are serialized.

pub mod id_map;
pub mod id_multi_map;
pub mod state_store;

pub use id_map::IdMap;
pub use id_multi_map::IdMultiMap;
pub use state_store::StateStore;
