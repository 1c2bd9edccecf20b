//! Storage adapter implementations for arbor-state stores.
//!
//! Adapters interoperate with the engine purely through its public surface:
//! [`load_or`](persist::load_or) seeds initial state from storage before
//! construction, and [`persist`](persist::persist) pushes every subsequent
//! change back through a non-immediate root subscription.

pub mod contract;
pub mod file;
pub mod memory;
pub mod persist;

pub use contract::{AdapterError, StorageAdapter};
pub use file::FileAdapter;
pub use memory::MemoryAdapter;
pub use persist::{load_or, persist, Persistence};
