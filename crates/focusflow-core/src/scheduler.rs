//! Repeating tick delivery.
//!
//! The timer engine never owns a thread or timer. It asks a [`Scheduler`]
//! for a repeating callback and cancels it when paused.
//!
//! - [`TokioScheduler`]: one interval task per subscription on a tokio runtime
//! - [`ManualScheduler`]: fires only when told to; deterministic for tests

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

/// Identifies one live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Called with the handle of the subscription that fired.
pub type TickCallback = Box<dyn FnMut(SubscriptionHandle) + Send + 'static>;

/// Where the engine's ticks are delivered, tagged with their subscription so
/// ticks from a cancelled one can be told apart.
pub type TickSink = Arc<dyn Fn(SubscriptionHandle) + Send + Sync>;

pub trait Scheduler: Send {
    /// Invoke `callback` every `interval` until cancelled.
    fn subscribe(&mut self, interval: Duration, callback: TickCallback) -> SubscriptionHandle;

    /// Stop a subscription. Unknown handles are ignored.
    fn cancel(&mut self, handle: SubscriptionHandle);
}

/// Spawns one interval task per subscription.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: u64,
    tasks: HashMap<SubscriptionHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    pub fn active(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn subscribe(&mut self, interval: Duration, mut callback: TickCallback) -> SubscriptionHandle {
        self.next_id += 1;
        let handle = SubscriptionHandle(self.next_id);

        let task = self.runtime.spawn(async move {
            // First tick one full interval from now, not immediately.
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                callback(handle);
            }
        });

        debug!(subscription = handle.0, ?interval, "tick subscription started");
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: SubscriptionHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!(subscription = handle.0, "tick subscription cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    subscriptions: BTreeMap<SubscriptionHandle, (Duration, TickCallback)>,
}

/// Scheduler that only fires on [`ManualScheduler::fire`].
///
/// Clones share state, so a test can keep one clone while the engine owns
/// another.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invoke every live callback once. Returns how many fired.
    pub fn fire(&self) -> usize {
        let mut inner = self.lock();
        for (handle, (_, callback)) in inner.subscriptions.iter_mut() {
            callback(*handle);
        }
        inner.subscriptions.len()
    }

    pub fn active(&self) -> Vec<SubscriptionHandle> {
        self.lock().subscriptions.keys().copied().collect()
    }

    pub fn interval_of(&self, handle: SubscriptionHandle) -> Option<Duration> {
        self.lock().subscriptions.get(&handle).map(|(i, _)| *i)
    }
}

impl Scheduler for ManualScheduler {
    fn subscribe(&mut self, interval: Duration, callback: TickCallback) -> SubscriptionHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let handle = SubscriptionHandle(inner.next_id);
        inner.subscriptions.insert(handle, (interval, callback));
        handle
    }

    fn cancel(&mut self, handle: SubscriptionHandle) {
        self.lock().subscriptions.remove(&handle);
    }
}
