//! Deferred values driven by an external clock.

use tracing::trace;

#[derive(Debug)]
struct Pending<T> {
    generation: u64,
    due_ms: u64,
    value: T,
}

/// Holds the latest scheduled value until its quiet period has passed.
///
/// Scheduling again replaces the pending value and restarts the timer.
/// Each schedule gets a generation number so a host-side timer can tell
/// whether it is still the current one.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay_ms: u64,
    generation: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            generation: 0,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now_ms: u64) -> u64 {
        self.generation += 1;
        if self.pending.is_some() {
            trace!(generation = self.generation, "superseding pending value");
        }
        self.pending = Some(Pending {
            generation: self.generation,
            due_ms: now_ms.saturating_add(self.delay_ms),
            value,
        });
        self.generation
    }

    /// Take the value once it is due.
    pub fn take_due(&mut self, now_ms: u64) -> Option<T> {
        if self.pending.as_ref()?.due_ms > now_ms {
            return None;
        }
        self.pending.take().map(|p| p.value)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.generation == generation)
    }

    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.due_ms)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
