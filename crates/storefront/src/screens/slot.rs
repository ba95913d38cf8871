use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::repository::LoadState;

/// Observable holder of the latest state of one screen query.
///
/// Holds only the most recent value, never a history. `None` means nothing
/// has been requested yet. Cloning shares the slot.
///
/// Each writer holds a generation from [`Slot::begin`]. Starting a new
/// generation fences off every earlier writer, so a superseded task can
/// never overwrite the state of the request that replaced it.
pub struct Slot<T> {
    sender: Arc<watch::Sender<Option<LoadState<T>>>>,
    generation: Arc<AtomicU64>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.sender.borrow() {
            None => "absent",
            Some(LoadState::Loading) => "loading",
            Some(LoadState::Success(_)) => "success",
            Some(LoadState::Error(_)) => "error",
        };
        f.debug_struct("Slot").field("state", &state).finish()
    }
}

impl<T: Clone> Slot<T> {
    /// Slot that starts out `Loading`.
    #[must_use]
    pub fn loading() -> Self {
        Self::with(Some(LoadState::Loading))
    }

    /// Slot with nothing requested yet.
    #[must_use]
    pub fn absent() -> Self {
        Self::with(None)
    }

    fn with(initial: Option<LoadState<T>>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<LoadState<T>> {
        self.sender.borrow().clone()
    }

    /// Receiver notified on every new state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<LoadState<T>>> {
        self.sender.subscribe()
    }

    /// Write `state` as the newest writer, fencing off in-flight ones.
    pub fn set(&self, state: LoadState<T>) {
        let generation = self.begin(false);
        self.set_for(generation, state);
    }

    /// Start a new writer generation and return it.
    ///
    /// With `reset` the slot shows `Loading` before this returns.
    pub(crate) fn begin(&self, reset: bool) -> u64 {
        let mut generation = 0;
        // Bumped under the channel lock so it orders with `set_for`.
        self.sender.send_if_modified(|value| {
            generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            if reset {
                *value = Some(LoadState::Loading);
            }
            reset
        });
        generation
    }

    /// Write `state` unless a newer generation has begun since `generation`.
    ///
    /// Returns whether the state was written.
    pub(crate) fn set_for(&self, generation: u64, state: LoadState<T>) -> bool {
        self.sender.send_if_modified(|value| {
            let current = self.generation.load(Ordering::Acquire) == generation;
            if current {
                *value = Some(state);
            }
            current
        })
    }

    /// Wait until the slot holds `Success` or `Error` and return it.
    ///
    /// Returns immediately if it already does. Never returns for a slot
    /// nothing is launched into.
    pub async fn settled(&self) -> LoadState<T> {
        let mut receiver = self.subscribe();
        loop {
            let current = receiver.borrow_and_update().clone();
            if let Some(state) = current.filter(LoadState::is_terminal) {
                return state;
            }
            if receiver.changed().await.is_err() {
                // The sender lives as long as `self`.
                std::future::pending::<()>().await;
            }
        }
    }
}
