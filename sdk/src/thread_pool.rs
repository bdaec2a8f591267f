//! Thread pool with scoped join sets.
//!
//! [`ThreadPool`] runs boxed jobs on up to `max_threads` OS threads, creating
//! them lazily when no idle thread can pick up new work. A [`JoinSet`] groups
//! jobs spawned through it so they can be awaited together; the first error
//! (or panic) among them is returned by [`JoinSet::wait`] once every job of
//! the set has finished.
//!
//! Jobs are taken newest first. Callers must not rely on any execution order.

use crate::error::{panic_message, Result, SdkError};
use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A queued job plus the join set it reports to.
///
/// Dropping a task, whether after running it or unrun during a failed
/// spawn, counts it as finished for its join set.
struct Task {
    job: Option<Job>,
    join: Option<Arc<JoinState>>,
}

impl Task {
    fn run(mut self) {
        let Some(job) = self.job.take() else {
            return;
        };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
            let message = panic_message(payload.as_ref());
            error!(panic = %message, "Job panicked in thread pool");
            if let Some(join) = &self.join {
                join.record_error(SdkError::Panicked(message));
            }
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            join.task_finished();
        }
    }
}

#[derive(Default)]
struct PoolState {
    queue: Vec<Task>,
    idle: usize,
    threads: usize,
    stop: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    work_available: Condvar,
}

/// Pool of worker threads executing boxed jobs
pub struct ThreadPool {
    shared: Arc<Shared>,
    max_threads: usize,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Create a pool running at most `max_threads` jobs at once.
    ///
    /// `0` means one thread per available CPU. No thread is started until
    /// work is spawned.
    pub fn new(max_threads: usize) -> Self {
        let max_threads = if max_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            max_threads
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState::default()),
                work_available: Condvar::new(),
            }),
            max_threads,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Maximum number of worker threads
    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Number of worker threads started so far
    pub fn thread_count(&self) -> usize {
        self.shared.state.lock().threads
    }

    /// Run `job` on the pool.
    ///
    /// Fails with [`SdkError::PoolStopped`] once [`shutdown`](Self::shutdown)
    /// has been called.
    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Task {
            job: Some(Box::new(job)),
            join: None,
        })
    }

    fn push(&self, task: Task) -> Result<()> {
        // Held until the new thread's handle is stored, so `shutdown` either
        // rejects this push or sees the handle.
        let mut handles = self.handles.lock();
        let start_thread = {
            let mut state = self.shared.state.lock();
            if state.stop {
                return Err(SdkError::PoolStopped);
            }
            state.queue.push(task);
            let start = state.queue.len() > state.idle && state.threads < self.max_threads;
            if start {
                state.threads += 1;
            }
            start
        };
        self.shared.work_available.notify_one();

        if start_thread {
            self.start_worker(&mut handles)?;
        }
        Ok(())
    }

    fn start_worker(&self, handles: &mut Vec<JoinHandle<()>>) -> Result<()> {
        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name(format!("armonik-pool-{}", handles.len()))
            .spawn(move || worker_loop(shared));

        match spawned {
            Ok(handle) => {
                debug!(threads = handles.len() + 1, "Started pool thread");
                handles.push(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.state.lock().threads -= 1;
                error!(error = %e, "Failed to start pool thread");
                Err(SdkError::Io(e))
            }
        }
    }

    /// Stop accepting work, run what is already queued, then join every
    /// worker thread.
    ///
    /// Called automatically on drop. When invoked from one of the pool's own
    /// threads, that thread is left to exit on its own.
    pub fn shutdown(&self) {
        let handles = {
            let mut handles = self.handles.lock();
            self.shared.state.lock().stop = true;
            std::mem::take(&mut *handles)
        };
        self.shared.work_available.notify_all();

        let current = std::thread::current().id();
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!("Pool thread exited with a panic");
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if let Some(task) = state.queue.pop() {
                    break Some(task);
                }
                if state.stop {
                    break None;
                }
                state.idle += 1;
                shared.work_available.wait(&mut state);
                state.idle -= 1;
            }
        };

        match task {
            Some(task) => task.run(),
            None => return,
        }
    }
}

struct JoinInner {
    live: usize,
    first_error: Option<SdkError>,
}

struct JoinState {
    inner: Mutex<JoinInner>,
    all_done: Condvar,
}

impl JoinState {
    fn record_error(&self, err: SdkError) {
        let mut inner = self.inner.lock();
        if inner.first_error.is_none() {
            inner.first_error = Some(err);
        } else {
            warn!(error = %err, "Dropping additional error in join set");
        }
    }

    fn task_finished(&self) {
        let mut inner = self.inner.lock();
        inner.live -= 1;
        if inner.live == 0 {
            self.all_done.notify_all();
        }
    }
}

/// A group of jobs on a [`ThreadPool`] that can be awaited together.
///
/// Several join sets can share one pool. Dropping a join set blocks until
/// its jobs are done; an error nobody collected through [`wait`](Self::wait)
/// is logged.
///
/// Waiting on a join set from inside one of its pool's jobs can deadlock if
/// the pool has no spare thread.
pub struct JoinSet<'pool> {
    pool: &'pool ThreadPool,
    state: Arc<JoinState>,
}

impl<'pool> JoinSet<'pool> {
    pub fn new(pool: &'pool ThreadPool) -> Self {
        Self {
            pool,
            state: Arc::new(JoinState {
                inner: Mutex::new(JoinInner {
                    live: 0,
                    first_error: None,
                }),
                all_done: Condvar::new(),
            }),
        }
    }

    /// Run `job` on the pool as part of this set.
    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.state.inner.lock().live += 1;

        let state = Arc::clone(&self.state);
        self.pool.push(Task {
            job: Some(Box::new(move || {
                if let Err(err) = job() {
                    state.record_error(err);
                }
            })),
            join: Some(Arc::clone(&self.state)),
        })
    }

    /// Number of jobs of this set that have not finished yet
    pub fn pending(&self) -> usize {
        self.state.inner.lock().live
    }

    /// Block until every job of the set has finished.
    ///
    /// Returns the first error raised by a job, if any. Other errors were
    /// logged when they occurred.
    pub fn wait(&self) -> Result<()> {
        let mut inner = self.state.inner.lock();
        while inner.live > 0 {
            self.state.all_done.wait(&mut inner);
        }
        match inner.first_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for JoinSet<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.wait() {
            error!(error = %err, "Unobserved error in join set");
        }
    }
}
