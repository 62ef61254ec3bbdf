//! Disposer bag scoped to one owner

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{Scheduler, TaskHandle};

enum Entry {
    Task(TaskHandle),
    Callback(Box<dyn FnOnce() + Send>),
}

/// Collects every deferred task and cleanup callback of one owner so they can
/// be cancelled together.
///
/// Clones share the same bag. Disposing empties it; the bag can be reused
/// afterwards.
#[derive(Clone)]
pub struct Disposables {
    scheduler: Scheduler,
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl fmt::Debug for Disposables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposables")
            .field("entries", &self.len())
            .finish()
    }
}

impl Disposables {
    /// Create an empty bag on `scheduler`
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn track(&self, handle: TaskHandle) -> TaskHandle {
        self.lock().push(Entry::Task(handle));
        handle
    }

    /// Register a cleanup callback run on [`Disposables::dispose`]
    pub fn add(&self, cleanup: impl FnOnce() + Send + 'static) {
        self.lock().push(Entry::Callback(Box::new(cleanup)));
    }

    pub fn queue_microtask(&self, task: impl FnOnce() + Send + 'static) -> TaskHandle {
        self.track(self.scheduler.queue_microtask(task))
    }

    pub fn request_animation_frame(&self, task: impl FnOnce() + Send + 'static) -> TaskHandle {
        self.track(self.scheduler.request_animation_frame(task))
    }

    /// Run `task` on the frame after the next one, once layout has settled
    pub fn next_frame(&self, task: impl FnOnce() + Send + 'static) {
        let bag = self.clone();
        self.request_animation_frame(move || {
            bag.request_animation_frame(task);
        });
    }

    pub fn set_timeout(&self, delay: Duration, task: impl FnOnce() + Send + 'static) -> TaskHandle {
        self.track(self.scheduler.set_timeout(delay, task))
    }

    /// Cancel every pending task and run every cleanup callback, newest first
    pub fn dispose(&self) {
        let entries: Vec<Entry> = self.lock().drain(..).collect();
        for entry in entries.into_iter().rev() {
            match entry {
                Entry::Task(handle) => {
                    self.scheduler.cancel(handle);
                }
                Entry::Callback(cleanup) => cleanup(),
            }
        }
    }

    /// Number of tracked entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
