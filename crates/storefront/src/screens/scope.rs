use std::future::Future;

use futures::StreamExt;
use tokio::task::{AbortHandle, JoinSet};
use tracing::debug;

use super::slot::Slot;
use crate::repository::ResultStream;

/// Owner of a screen's in-flight work.
///
/// Every stream launched through the scope runs as its own task and writes
/// only into its own slot. [`ScreenScope::destroy`] aborts all of them and
/// waits until they are gone, so nothing is written into a slot after it
/// returns. Dropping the scope aborts the tasks without waiting.
#[derive(Debug, Default)]
pub struct ScreenScope {
    tasks: JoinSet<()>,
}

impl ScreenScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Republish every state of `stream` into `slot`.
    ///
    /// The slot keeps its current value until the stream emits. Any writer
    /// launched into the slot earlier stops being able to write.
    pub fn launch<T>(&mut self, stream: ResultStream<T>, slot: &Slot<T>) -> AbortHandle
    where
        T: Clone + Send + Sync + 'static,
    {
        let generation = slot.begin(false);
        self.write(stream, slot, generation)
    }

    /// Re-run a query into `slot`, aborting the stream previously launched
    /// through the same handle.
    ///
    /// The slot shows `Loading` before this returns. The latest invocation
    /// wins the slot.
    pub fn relaunch<T>(
        &mut self,
        previous: &mut Option<AbortHandle>,
        stream: ResultStream<T>,
        slot: &Slot<T>,
    ) where
        T: Clone + Send + Sync + 'static,
    {
        Self::cancel(previous);
        let generation = slot.begin(true);
        *previous = Some(self.write(stream, slot, generation));
    }

    /// Like [`Self::relaunch`] for mutations: the slot keeps its value until
    /// the terminal state arrives.
    pub fn relaunch_mutation<T>(
        &mut self,
        previous: &mut Option<AbortHandle>,
        stream: ResultStream<T>,
        slot: &Slot<T>,
    ) where
        T: Clone + Send + Sync + 'static,
    {
        Self::cancel(previous);
        *previous = Some(self.launch(stream, slot));
    }

    fn cancel(previous: &mut Option<AbortHandle>) {
        if let Some(handle) = previous.take() {
            handle.abort();
        }
    }

    fn write<T>(&mut self, stream: ResultStream<T>, slot: &Slot<T>, generation: u64) -> AbortHandle
    where
        T: Clone + Send + Sync + 'static,
    {
        let slot = slot.clone();
        self.spawn(async move {
            let mut stream = stream;
            while let Some(state) = stream.next().await {
                if !slot.set_for(generation, state) {
                    break;
                }
            }
        })
    }

    /// Run arbitrary screen work under the scope.
    pub fn spawn<F>(&mut self, task: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Reap finished tasks so the set only holds live work.
        while self.tasks.try_join_next().is_some() {}
        self.tasks.spawn(task)
    }

    /// Number of tasks that have not finished yet.
    pub fn in_flight(&mut self) -> usize {
        while self.tasks.try_join_next().is_some() {}
        self.tasks.len()
    }

    /// Cancel all in-flight work and wait for it to stop.
    pub async fn destroy(mut self) {
        let cancelled = self.in_flight();
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
        debug!(cancelled, "Screen scope destroyed");
    }
}
