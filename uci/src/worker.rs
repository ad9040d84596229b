//! Single background slot for long-running, cancellable work.
//!
//! The protocol thread hands tasks to [`Worker`] and immediately goes back to
//! reading input, so a later `stop` can reach the running task. Cancellation
//! is cooperative: a task polls its [`StopSignal`] and returns when it sees
//! the flag raised.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error};

/// Cancellation flag handed to a running task.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once cancellation has been requested.
    pub fn should_stop(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }
}

pub type Task = Box<dyn FnOnce(StopSignal) + Send + 'static>;

#[derive(Default)]
struct Slot {
    // Next task to run, with the signal it will observe.
    pending: Option<(Task, StopSignal)>,
    // Signal of the task currently executing, if any.
    current: Option<StopSignal>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs at most one task at a time on a dedicated thread.
///
/// A task submitted while another one runs is queued behind it; a second
/// submission before the queued one starts replaces it. `submit` does not
/// wait for the running task to observe a stop request, so the only ordering
/// guarantee between consecutive tasks is that they never overlap.
#[derive(Default)]
pub struct Worker {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the worker thread if it is not running yet.
    pub fn awake(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.is_some() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        *handle = Some(thread::spawn(move || run(&shared)));
        debug!("Worker thread started");
    }

    /// Installs `task` as the next one to run, with a fresh stop signal.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce(StopSignal) + Send + 'static,
    {
        self.awake();

        let mut slot = self.shared.lock();
        if slot.pending.is_some() {
            debug!("Replacing queued task");
        }
        slot.pending = Some((Box::new(task), StopSignal::new()));
        drop(slot);

        self.shared.wake.notify_one();
    }

    /// Raises the stop signal of the running and queued tasks. Does not wait.
    pub fn request_stop(&self) {
        let slot = self.shared.lock();
        if let Some(signal) = &slot.current {
            signal.raise();
        }
        if let Some((_, signal)) = &slot.pending {
            signal.raise();
        }
    }

    /// True while a task is queued or executing.
    pub fn is_running(&self) -> bool {
        let slot = self.shared.lock();
        slot.pending.is_some() || slot.current.is_some()
    }

    /// Requests a stop, then blocks until no task is queued or executing.
    pub fn stop_and_wait(&self) {
        self.request_stop();
        self.wait_idle();
    }

    /// Blocks until no task is queued or executing.
    pub fn wait_idle(&self) {
        let mut slot = self.shared.lock();
        while slot.pending.is_some() || slot.current.is_some() {
            slot = self
                .shared
                .idle
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.request_stop();
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_all();

        let handle = self.handle.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = handle.take() {
            let _ = handle.join();
            debug!("Worker thread joined");
        }
    }
}

fn run(shared: &Shared) {
    loop {
        let (task, signal) = {
            let mut slot = shared.lock();
            loop {
                if slot.shutdown {
                    slot.pending = None;
                    shared.idle.notify_all();
                    return;
                }
                if let Some(next) = slot.pending.take() {
                    slot.current = Some(next.1.clone());
                    break next;
                }
                slot = shared.wake.wait(slot).unwrap_or_else(PoisonError::into_inner);
            }
        };

        debug!("Task started");
        match panic::catch_unwind(AssertUnwindSafe(|| task(signal))) {
            Ok(()) => debug!("Task finished"),
            Err(payload) => error!("Task panicked: {}", panic_message(&*payload)),
        }

        let mut slot = shared.lock();
        slot.current = None;
        if slot.pending.is_none() {
            shared.idle.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
