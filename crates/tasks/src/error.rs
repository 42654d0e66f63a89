use thiserror::Error;

/// Boxed error returned by a failed task.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("executor has been disposed")]
    Disposed,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("task failed: {0}")]
    Failed(#[source] BoxError),
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("{0} worker thread(s) panicked during shutdown")]
    ShutdownFailed(usize),
}

impl From<anyhow::Error> for TaskError {
    fn from(e: anyhow::Error) -> Self {
        TaskError::Failed(e.into())
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
