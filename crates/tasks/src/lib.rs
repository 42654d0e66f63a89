//! Background task execution on a fixed pool of worker threads.

pub mod error;
pub mod executor;

pub use error::{BoxError, TaskError, TaskResult};
pub use executor::{AsyncExecutor, AsyncResult};
