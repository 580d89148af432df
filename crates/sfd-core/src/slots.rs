//! Slot pool: admission gate that caps concurrently running downloads.
//!
//! A slot is taken before a worker is spawned and given back when the
//! worker's `SlotGuard` drops, whatever the outcome. The pool also tracks how
//! many slots are held right now and the highest count seen.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Default)]
struct SlotCounters {
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

/// Fixed-capacity pool. Cloning shares the same slots.
#[derive(Debug, Clone)]
pub struct SlotPool {
    capacity: usize,
    semaphore: Arc<Semaphore>,
    counters: Arc<SlotCounters>,
}

impl SlotPool {
    /// Capacity is clamped to at least 1 so a misconfigured pool cannot deadlock.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            counters: Arc::new(SlotCounters::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    pub fn in_use(&self) -> usize {
        self.counters.in_use.load(Ordering::Acquire)
    }

    /// Highest number of slots held at once since the pool was created.
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::Acquire)
    }

    /// Waits until a slot is free. No fairness guarantee between waiters.
    pub async fn acquire(&self) -> Result<SlotGuard, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        Ok(self.guard(permit))
    }

    fn guard(&self, permit: OwnedSemaphorePermit) -> SlotGuard {
        let now = self.counters.in_use.fetch_add(1, Ordering::AcqRel) + 1;
        self.counters.peak.fetch_max(now, Ordering::AcqRel);
        SlotGuard {
            counters: Arc::clone(&self.counters),
            _permit: permit,
        }
    }
}

/// Releases its slot when dropped.
#[derive(Debug)]
pub struct SlotGuard {
    counters: Arc<SlotCounters>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        // Runs before the permit field is dropped, so in_use never exceeds capacity.
        self.counters.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}
