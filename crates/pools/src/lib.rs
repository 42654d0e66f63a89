//! Object pooling: reusable free-lists and a per-type pool registry.

pub mod pool;
pub mod registry;

pub use pool::{Pool, Poolable};
pub use registry::{DEFAULT_MAX, Pools};
