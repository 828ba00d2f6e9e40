// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::{FrameEvent, Phase};
use crate::cache::CacheElement;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Buckets = [Vec<FrameEvent>; Phase::COUNT];
type FlushHook = Box<dyn Fn(&FrameListener) + Send + Sync>;

/// A thread-safe queue of [`FrameEvent`]s with one FIFO bucket per [`Phase`].
///
/// Any thread may post; the render thread drains one phase at a time. The
/// bucket is swapped out under the lock and executed after the lock is
/// released, so events posted while a batch runs (including by the batch
/// itself) wait for the next [`fire_events`](Self::fire_events) call.
pub struct FrameListener {
    name: String,
    buckets: Mutex<Buckets>,
    flush_hook: Option<FlushHook>,
}

impl FrameListener {
    /// Creates an empty listener.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buckets: Mutex::new(std::array::from_fn(|_| Vec::new())),
            flush_hook: None,
        }
    }

    /// Installs a hook called at the end of every [`flush`](Self::flush), for
    /// listener-specific teardown.
    pub fn with_flush_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FrameListener) + Send + Sync + 'static,
    {
        self.flush_hook = Some(Box::new(hook));
        self
    }

    /// The listener name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn buckets(&self) -> MutexGuard<'_, Buckets> {
        // Buckets are only pushed to or swapped out, so a poisoned lock still holds valid data.
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `event` at the back of the bucket for its phase.
    pub fn post_event(&self, event: FrameEvent) {
        let phase = event.phase();
        log::trace!(
            "FrameListener '{}': queued {} event for {}",
            self.name,
            event.kind(),
            phase
        );
        self.buckets()[phase.index()].push(event);
    }

    /// Applies every event queued for `phase`, in post order, on the calling thread.
    ///
    /// Returns `false` if an event failed. The first failure stops the batch:
    /// the events after it are dropped without being applied and are not
    /// queued again.
    pub fn fire_events(&self, phase: Phase) -> bool {
        let batch = std::mem::take(&mut self.buckets()[phase.index()]);
        if batch.is_empty() {
            return true;
        }

        let mut events = batch.into_iter();
        let mut result = true;
        for event in events.by_ref() {
            if let Err(err) = event.apply() {
                log::error!("Encountered exception while processing events: {err}");
                result = false;
                break;
            }
        }

        let discarded = events.len();
        if discarded > 0 {
            log::warn!(
                "FrameListener '{}': discarded {} {} event(s) after a failure",
                self.name,
                discarded,
                phase
            );
        }

        result
    }

    /// Drops every pending event of every phase without applying it, then
    /// runs the flush hook. Returns the number of events discarded.
    pub fn flush(&self) -> usize {
        let discarded: Vec<Vec<FrameEvent>> = self
            .buckets()
            .iter_mut()
            .map(std::mem::take)
            .collect();
        let count = discarded.iter().map(Vec::len).sum();
        drop(discarded);

        if count > 0 {
            log::debug!(
                "FrameListener '{}': flushed {} pending event(s)",
                self.name,
                count
            );
        }

        if let Some(hook) = &self.flush_hook {
            hook(self);
        }

        count
    }

    /// Number of events waiting for `phase`.
    pub fn pending(&self, phase: Phase) -> usize {
        self.buckets()[phase.index()].len()
    }

    /// Number of events waiting across all phases.
    pub fn pending_total(&self) -> usize {
        self.buckets().iter().map(Vec::len).sum()
    }

    /// Returns `true` if no event is waiting in any phase.
    pub fn is_empty(&self) -> bool {
        self.pending_total() == 0
    }
}

impl CacheElement for FrameListener {
    const TYPE_NAME: &'static str = "FrameListener";

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for FrameListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameListener")
            .field("name", &self.name)
            .field("pending", &self.pending_total())
            .finish()
    }
}

impl Drop for FrameListener {
    fn drop(&mut self) {
        let buckets = self
            .buckets
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let pending: usize = buckets.iter().map(Vec::len).sum();
        if pending > 0 {
            log::debug!(
                "FrameListener '{}' dropped with {} pending event(s)",
                self.name,
                pending
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str, phase: Phase) -> FrameEvent {
        let log = log.clone();
        FrameEvent::functor(phase, move || {
            log.lock().unwrap().push(tag);
            Ok(true)
        })
    }

    #[test]
    fn events_fire_in_post_order() {
        let listener = FrameListener::new("test");
        let log = Arc::new(Mutex::new(Vec::new()));

        listener.post_event(recorder(&log, "e1", Phase::PreRender));
        listener.post_event(recorder(&log, "e2", Phase::PreRender));
        listener.post_event(recorder(&log, "e3", Phase::PreRender));

        assert_eq!(listener.pending(Phase::PreRender), 3);
        assert!(listener.fire_events(Phase::PreRender));
        assert_eq!(*log.lock().unwrap(), vec!["e1", "e2", "e3"]);
        assert!(listener.is_empty());
    }

    #[test]
    fn phases_are_drained_independently() {
        let listener = FrameListener::new("test");
        let log = Arc::new(Mutex::new(Vec::new()));

        listener.post_event(recorder(&log, "post", Phase::PostRender));
        listener.post_event(recorder(&log, "pre", Phase::PreRender));

        assert!(listener.fire_events(Phase::PreRender));
        assert_eq!(*log.lock().unwrap(), vec!["pre"]);
        assert_eq!(listener.pending(Phase::PostRender), 1);

        assert!(listener.fire_events(Phase::PostRender));
        assert_eq!(*log.lock().unwrap(), vec!["pre", "post"]);
    }

    #[test]
    fn firing_an_empty_phase_succeeds() {
        let listener = FrameListener::new("test");
        assert!(listener.fire_events(Phase::QueueRender));
    }

    #[test]
    fn events_posted_during_fire_wait_for_next_call() {
        let listener = Arc::new(FrameListener::new("test"));
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_log = log.clone();
        let inner_listener = listener.clone();
        listener.post_event(FrameEvent::functor(Phase::PreRender, move || {
            inner_log.lock().unwrap().push("e1");
            inner_listener.post_event(recorder(&inner_log, "e3", Phase::PreRender));
            Ok(true)
        }));

        assert!(listener.fire_events(Phase::PreRender));
        assert_eq!(*log.lock().unwrap(), vec!["e1"]);
        assert_eq!(listener.pending(Phase::PreRender), 1);

        assert!(listener.fire_events(Phase::PreRender));
        assert_eq!(*log.lock().unwrap(), vec!["e1", "e3"]);
    }

    #[test]
    fn flush_discards_without_applying() {
        let applied = Arc::new(AtomicBool::new(false));
        let flushed = Arc::new(AtomicUsize::new(0));

        let hook_count = flushed.clone();
        let listener = FrameListener::new("test").with_flush_hook(move |_| {
            hook_count.fetch_add(1, Ordering::SeqCst);
        });

        let flag = applied.clone();
        listener.post_event(FrameEvent::functor(Phase::PreRender, move || {
            flag.store(true, Ordering::SeqCst);
            Ok(true)
        }));
        listener.post_event(FrameEvent::functor(Phase::PostRender, || Ok(true)));

        assert_eq!(listener.flush(), 2);
        assert!(listener.fire_events(Phase::PreRender));
        assert!(!applied.load(Ordering::SeqCst));
        assert_eq!(flushed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_stops_batch_and_discards_remainder() {
        let listener = FrameListener::new("test");
        let log = Arc::new(Mutex::new(Vec::new()));

        listener.post_event(recorder(&log, "e1", Phase::PreRender));
        listener.post_event(FrameEvent::functor(Phase::PreRender, || {
            anyhow::bail!("out of memory")
        }));
        listener.post_event(recorder(&log, "e3", Phase::PreRender));

        assert!(!listener.fire_events(Phase::PreRender));
        assert_eq!(*log.lock().unwrap(), vec!["e1"]);

        // The skipped event is gone, not re-queued.
        assert_eq!(listener.pending(Phase::PreRender), 0);
        assert!(listener.fire_events(Phase::PreRender));
        assert_eq!(*log.lock().unwrap(), vec!["e1"]);
    }

    #[test]
    fn posting_from_many_threads() {
        let listener = Arc::new(FrameListener::new("test"));
        let count = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let listener = listener.clone();
                let count = count.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let count = count.clone();
                        listener.post_event(FrameEvent::functor(Phase::QueueRender, move || {
                            count.fetch_add(1, Ordering::SeqCst);
                            Ok(true)
                        }));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Poster thread panicked");
        }

        assert_eq!(listener.pending(Phase::QueueRender), 800);
        assert!(listener.fire_events(Phase::QueueRender));
        assert_eq!(count.load(Ordering::SeqCst), 800);
    }

    #[test]
    fn posts_racing_fire_are_applied_exactly_once() {
        const POSTS: usize = 2000;
        let listener = Arc::new(FrameListener::new("test"));
        let applied = Arc::new(Mutex::new(Vec::with_capacity(POSTS)));
        let done = Arc::new(AtomicBool::new(false));

        let poster = {
            let listener = listener.clone();
            let applied = applied.clone();
            let done = done.clone();
            thread::spawn(move || {
                for index in 0..POSTS {
                    let applied = applied.clone();
                    listener.post_event(FrameEvent::functor(Phase::PreRender, move || {
                        applied.lock().unwrap().push(index);
                        Ok(true)
                    }));
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        while !done.load(Ordering::SeqCst) {
            assert!(listener.fire_events(Phase::PreRender));
        }
        poster.join().expect("Poster thread panicked");
        // Whatever landed after the last racing call runs on the next one.
        assert!(listener.fire_events(Phase::PreRender));

        let applied = applied.lock().unwrap();
        // One poster, so FIFO per bucket also holds across batches.
        assert_eq!(*applied, (0..POSTS).collect::<Vec<_>>());
        assert!(listener.is_empty());
    }
}
