//! Cooperative deferral for the headless engine
//!
//! The engine never blocks. Work that must wait is queued here and run when
//! the host pumps the queue:
//! - microtasks, drained by [`Scheduler::run_microtasks`] after every
//!   host event handler
//! - animation-frame callbacks, run by [`Scheduler::run_animation_frame`]
//! - timers on a virtual clock, fired by [`Scheduler::advance`]
//!
//! Every queued task gets a [`TaskHandle`] that cancels it. Owners collect
//! their handles in a [`Disposables`] bag and dispose it on teardown.

mod disposables;

pub use disposables::Disposables;

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Task = Box<dyn FnOnce() + Send>;

/// Which queue a task was placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Microtask,
    AnimationFrame,
    Timeout,
}

/// Cancels one queued task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    id: u64,
    kind: TaskKind,
}

impl TaskHandle {
    /// Which queue the task lives on
    pub fn kind(&self) -> TaskKind {
        self.kind
    }
}

struct Timer {
    id: u64,
    due: Duration,
    task: Task,
}

#[derive(Default)]
struct SchedulerInner {
    next_id: u64,
    now: Duration,
    microtasks: VecDeque<(u64, Task)>,
    frames: VecDeque<(u64, Task)>,
    timers: Vec<Timer>,
}

impl SchedulerInner {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared handle to one set of task queues
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("microtasks", &inner.microtasks.len())
            .field("frames", &inner.frames.len())
            .field("timers", &inner.timers.len())
            .finish()
    }
}

impl Scheduler {
    /// Create an empty scheduler with its clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queue a microtask
    pub fn queue_microtask(&self, task: impl FnOnce() + Send + 'static) -> TaskHandle {
        let mut inner = self.lock();
        let id = inner.allocate();
        inner.microtasks.push_back((id, Box::new(task)));
        TaskHandle {
            id,
            kind: TaskKind::Microtask,
        }
    }

    /// Queue a callback for the next animation frame
    pub fn request_animation_frame(&self, task: impl FnOnce() + Send + 'static) -> TaskHandle {
        let mut inner = self.lock();
        let id = inner.allocate();
        inner.frames.push_back((id, Box::new(task)));
        TaskHandle {
            id,
            kind: TaskKind::AnimationFrame,
        }
    }

    /// Run `task` once `delay` has elapsed on the virtual clock
    pub fn set_timeout(&self, delay: Duration, task: impl FnOnce() + Send + 'static) -> TaskHandle {
        let mut inner = self.lock();
        let id = inner.allocate();
        let due = inner.now + delay;
        inner.timers.push(Timer {
            id,
            due,
            task: Box::new(task),
        });
        TaskHandle {
            id,
            kind: TaskKind::Timeout,
        }
    }

    /// Cancel a queued task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&self, handle: TaskHandle) -> bool {
        let mut inner = self.lock();
        match handle.kind {
            TaskKind::Microtask => remove_queued(&mut inner.microtasks, handle.id),
            TaskKind::AnimationFrame => remove_queued(&mut inner.frames, handle.id),
            TaskKind::Timeout => {
                let before = inner.timers.len();
                inner.timers.retain(|t| t.id != handle.id);
                inner.timers.len() != before
            }
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks waiting on any queue
    pub fn pending(&self) -> usize {
        let inner = self.lock();
        inner.microtasks.len() + inner.frames.len() + inner.timers.len()
    }

    /// Drain the microtask queue, including microtasks queued while draining.
    /// Returns how many ran.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.lock().microtasks.pop_front();
            match next {
                Some((_, task)) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Run the callbacks queued before this frame started, then drain
    /// microtasks after each. Callbacks queued during the frame wait for the
    /// next one; callbacks cancelled during the frame do not run.
    pub fn run_animation_frame(&self) -> usize {
        let boundary = self.lock().next_id;
        let mut ran = 0;
        loop {
            let next = {
                let mut inner = self.lock();
                match inner.frames.front() {
                    Some((id, _)) if *id <= boundary => inner.frames.pop_front(),
                    _ => None,
                }
            };
            match next {
                Some((_, task)) => {
                    task();
                    ran += 1;
                    ran += self.run_microtasks();
                }
                None => return ran,
            }
        }
    }

    /// Move the clock forward, firing due timers in due order. Microtasks are
    /// drained after each timer.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut ran = 0;
        loop {
            let next = {
                let mut inner = self.lock();
                let due_index = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                match due_index {
                    Some(i) => {
                        let timer = inner.timers.remove(i);
                        inner.now = timer.due;
                        Some(timer.task)
                    }
                    None => {
                        inner.now = target;
                        None
                    }
                }
            };
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                    ran += self.run_microtasks();
                }
                None => return ran,
            }
        }
    }
}

fn remove_queued(queue: &mut VecDeque<(u64, Task)>, id: u64) -> bool {
    match queue.iter().position(|(task_id, _)| *task_id == id) {
        Some(index) => {
            queue.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let read = count.clone();
        (count, move || read.load(Ordering::SeqCst))
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let scheduler = Scheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (label, ms) in [("late", 300), ("early", 100), ("middle", 200)] {
            let order = order.clone();
            scheduler.set_timeout(Duration::from_millis(ms), move || {
                order.lock().unwrap().push(label);
            });
        }

        assert_eq!(scheduler.advance(Duration::from_millis(250)), 2);
        assert_eq!(*order.lock().unwrap(), vec!["early", "middle"]);
        assert_eq!(scheduler.now(), Duration::from_millis(250));

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*order.lock().unwrap(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let scheduler = Scheduler::new();
        let (count, read) = counter();
        let handle = scheduler.set_timeout(Duration::from_millis(10), move || {
            count.fetch_add(1, Ordering::SeqCst);
        });

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        scheduler.advance(Duration::from_millis(20));
        assert_eq!(read(), 0);
    }

    #[test]
    fn test_microtasks_queued_while_draining_also_run() {
        let scheduler = Scheduler::new();
        let (count, read) = counter();
        let inner_scheduler = scheduler.clone();
        let inner_count = count.clone();
        scheduler.queue_microtask(move || {
            count.fetch_add(1, Ordering::SeqCst);
            inner_scheduler.queue_microtask(move || {
                inner_count.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(scheduler.run_microtasks(), 2);
        assert_eq!(read(), 2);
    }

    #[test]
    fn test_frame_callbacks_queued_during_frame_wait() {
        let scheduler = Scheduler::new();
        let (count, read) = counter();
        let nested = scheduler.clone();
        let nested_count = count.clone();
        scheduler.request_animation_frame(move || {
            count.fetch_add(1, Ordering::SeqCst);
            nested.request_animation_frame(move || {
                nested_count.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(scheduler.run_animation_frame(), 1);
        assert_eq!(read(), 1);
        assert_eq!(scheduler.run_animation_frame(), 1);
        assert_eq!(read(), 2);
    }

    #[test]
    fn test_handles_are_distinct_set_keys() {
        let scheduler = Scheduler::new();
        let handles: HashSet<TaskHandle> = [
            scheduler.queue_microtask(|| {}),
            scheduler.request_animation_frame(|| {}),
            scheduler.set_timeout(Duration::from_millis(5), || {}),
        ]
        .into_iter()
        .collect();
        assert_eq!(handles.len(), 3);
        let kinds: HashSet<TaskKind> = handles.iter().map(TaskHandle::kind).collect();
        assert!(kinds.contains(&TaskKind::Timeout));
        assert_eq!(kinds.len(), 3);
    }
}
