//! Fixed-size worker pool with blocking result handles.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};
use parking_lot::{Condvar, Mutex};

use crate::error::{TaskError, TaskResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Slot<T> {
    value: Mutex<Option<TaskResult<T>>>,
    ready: Condvar,
}

/// Handle to the outcome of a submitted task.
pub struct AsyncResult<T> {
    slot: Arc<Slot<T>>,
}

impl<T> AsyncResult<T> {
    /// Whether the task has finished. Never blocks.
    pub fn is_done(&self) -> bool {
        self.slot.value.lock().is_some()
    }

    /// Wait for the task and return its value. Task errors come back as
    /// [`TaskError::Failed`] with the task's error as the source.
    pub fn get(self) -> TaskResult<T> {
        let mut value = self.slot.value.lock();
        loop {
            if let Some(result) = value.take() {
                return result;
            }
            self.slot.ready.wait(&mut value);
        }
    }
}

impl<T> std::fmt::Debug for AsyncResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncResult")
            .field("done", &self.is_done())
            .finish()
    }
}

/// Runs tasks on `max_concurrent` named threads sharing one unbounded FIFO queue.
///
/// Not safe to dispose concurrently with `submit`; `dispose` takes `&mut self`.
pub struct AsyncExecutor {
    name: String,
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl AsyncExecutor {
    pub fn new(max_concurrent: usize, name: &str) -> TaskResult<Self> {
        if max_concurrent == 0 {
            return Err(TaskError::InvalidArgument("max_concurrent must be at least 1".into()));
        }
        let (sender, receiver) = unbounded::<Job>();
        let mut workers = Vec::with_capacity(max_concurrent);
        for index in 0..max_concurrent {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })?;
            workers.push(handle);
        }
        log::info!("Executor '{name}' started with {max_concurrent} worker(s)");
        Ok(Self {
            name: name.to_owned(),
            sender: Some(sender),
            workers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.sender.is_none()
    }

    /// Queue `task`. Submissions beyond the worker count wait in the queue.
    pub fn submit<T, F>(&self, task: F) -> TaskResult<AsyncResult<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(TaskError::Disposed)?;
        let slot = Arc::new(Slot {
            value: Mutex::new(None),
            ready: Condvar::new(),
        });
        let worker_slot = Arc::clone(&slot);
        let name = self.name.clone();
        let job: Job = Box::new(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(task)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(TaskError::from(e)),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::warn!("Task on executor '{name}' panicked: {message}");
                    Err(TaskError::Panicked(message))
                }
            };
            *worker_slot.value.lock() = Some(outcome);
            worker_slot.ready.notify_all();
        });
        sender.send(job).map_err(|_| TaskError::Disposed)?;
        Ok(AsyncResult { slot })
    }

    /// Stop accepting tasks, let queued ones finish and join every worker.
    /// Blocks until the queue drains. Calling it again is a no-op.
    pub fn dispose(&mut self) -> TaskResult<()> {
        let Some(sender) = self.sender.take() else {
            return Ok(());
        };
        drop(sender);
        let mut panicked = 0;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                panicked += 1;
            }
        }
        log::info!("Executor '{}' disposed", self.name);
        if panicked > 0 {
            return Err(TaskError::ShutdownFailed(panicked));
        }
        Ok(())
    }
}

impl Drop for AsyncExecutor {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            log::warn!("Executor '{}': {e}", self.name);
        }
    }
}

impl std::fmt::Debug for AsyncExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncExecutor")
            .field("name", &self.name)
            .field("workers", &self.workers.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn returns_task_value() {
        let exec = AsyncExecutor::new(2, "test").unwrap();
        let result = exec.submit(|| Ok(21 * 2)).unwrap();
        assert_eq!(result.get().unwrap(), 42);
    }

    #[test]
    fn is_done_once_task_finishes() {
        let mut exec = AsyncExecutor::new(1, "test").unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let result = exec
            .submit(move || {
                release_rx.recv()?;
                Ok(5u32)
            })
            .unwrap();
        assert!(!result.is_done());
        release_tx.send(()).unwrap();
        exec.dispose().unwrap();
        assert!(result.is_done());
        assert!(result.is_done());
        assert_eq!(result.get().unwrap(), 5);
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(
            AsyncExecutor::new(0, "none"),
            Err(TaskError::InvalidArgument(_))
        ));
    }

    #[test]
    fn task_error_keeps_cause() {
        let exec = AsyncExecutor::new(1, "test").unwrap();
        let result = exec
            .submit(|| -> anyhow::Result<()> { anyhow::bail!("disk on fire") })
            .unwrap();
        let err = result.get().unwrap_err();
        assert!(matches!(err, TaskError::Failed(_)));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("disk on fire"));
    }

    #[test]
    fn panic_is_captured_and_worker_survives() {
        let exec = AsyncExecutor::new(1, "test").unwrap();
        let bad = exec
            .submit(|| -> anyhow::Result<u8> { panic!("boom") })
            .unwrap();
        match bad.get() {
            Err(TaskError::Panicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(exec.submit(|| Ok(1u8)).unwrap().get().unwrap(), 1);
    }

    #[test]
    fn submit_after_dispose_fails() {
        let mut exec = AsyncExecutor::new(2, "test").unwrap();
        exec.dispose().unwrap();
        assert!(exec.is_disposed());
        assert!(matches!(exec.submit(|| Ok(())), Err(TaskError::Disposed)));
        exec.dispose().unwrap();
    }

    #[test]
    fn dispose_drains_queue() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut exec = AsyncExecutor::new(2, "test").unwrap();
        for _ in 0..20 {
            let ran = Arc::clone(&ran);
            exec.submit(move || {
                thread::sleep(Duration::from_millis(1));
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }
        exec.dispose().unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn queues_beyond_worker_count() {
        let exec = AsyncExecutor::new(1, "test").unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let blocker = exec
            .submit(move || {
                release_rx.recv()?;
                Ok(())
            })
            .unwrap();
        let queued = exec.submit(|| Ok("done")).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(!blocker.is_done());
        assert!(!queued.is_done());
        release_tx.send(()).unwrap();
        blocker.get().unwrap();
        assert_eq!(queued.get().unwrap(), "done");
    }

    #[test]
    fn workers_are_named() {
        let exec = AsyncExecutor::new(2, "loader").unwrap();
        let name = exec
            .submit(|| Ok(thread::current().name().map(str::to_owned)))
            .unwrap()
            .get()
            .unwrap();
        let name = name.unwrap_or_default();
        assert!(name == "loader-0" || name == "loader-1", "{name}");
    }
}
