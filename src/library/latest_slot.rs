use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Single-slot mailbox between one producer and one consumer.
///
/// `push_latest` never blocks: an untaken value is replaced by the newer one.
/// `put_blocking` waits until the consumer has emptied the slot instead.
pub struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
    changed: Condvar,
}

struct SlotState<T> {
    value: Option<T>,
    closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Stored,
    Displaced,
    Closed,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                value: None,
                closed: false,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_latest(&self, value: T) -> PushOutcome {
        let mut state = self.lock();
        if state.closed {
            return PushOutcome::Closed;
        }
        let displaced = state.value.replace(value);
        self.changed.notify_all();
        match displaced {
            Some(_) => PushOutcome::Displaced,
            None => PushOutcome::Stored,
        }
    }

    pub fn put_blocking(&self, value: T) -> PushOutcome {
        let mut state = self.lock();
        while state.value.is_some() && !state.closed {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.closed {
            return PushOutcome::Closed;
        }
        state.value = Some(value);
        self.changed.notify_all();
        PushOutcome::Stored
    }

    /// Blocks until a value is available. Returns `None` once closed; a value
    /// still pending at close time is dropped.
    pub fn take(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if state.closed {
                state.value = None;
                return None;
            }
            if let Some(value) = state.value.take() {
                self.changed.notify_all();
                return Some(value);
            }
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    #[cfg(test)]
    pub fn try_take(&self) -> Option<T> {
        let mut state = self.lock();
        let value = state.value.take();
        if value.is_some() {
            self.changed.notify_all();
        }
        value
    }

    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.value = None;
        self.changed.notify_all();
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
