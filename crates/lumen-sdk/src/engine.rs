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

//! The engine root object.

use crate::config::EngineConfig;
use lumen_core::cache::{deferred_cleaner, deferred_initialiser};
use lumen_core::{
    Cache, CacheElement, Cleanup, EngineContext, FrameEvent, FrameListener, Initialise, Phase,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Owns the engine context and the frame listeners, and drives the frame loop.
///
/// Producer threads create resources through caches built with
/// [`resource_cache`](Self::resource_cache); their GPU initialisation and
/// cleanup are queued on the default listener and run on whichever thread
/// calls [`render_frame`](Self::render_frame).
pub struct Engine {
    config: EngineConfig,
    context: Arc<EngineContext>,
    listeners: Cache<FrameListener>,
    default_listener: Arc<FrameListener>,
    frame_count: AtomicU64,
}

impl Engine {
    /// Builds the engine and every listener named by `config`.
    pub fn new(config: EngineConfig) -> Self {
        let context = Arc::new(config.context());
        let listeners: Cache<FrameListener> =
            Cache::new(context.clone(), |name: &String, ()| FrameListener::new(name.clone()));

        let default_listener = listeners.add(config.default_listener.clone(), ());
        for name in &config.listeners {
            listeners.add(name.clone(), ());
        }

        log::info!(
            "Lumen engine '{}' initialized with {} frame listener(s).",
            context.name(),
            listeners.len()
        );

        Self {
            config,
            context,
            listeners,
            default_listener,
            frame_count: AtomicU64::new(0),
        }
    }

    /// The configuration the engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared, read-only engine context.
    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    /// The cache holding every frame listener.
    pub fn listeners(&self) -> &Cache<FrameListener> {
        &self.listeners
    }

    /// The listener receiving [`post_event`](Self::post_event) and resource cache events.
    pub fn default_listener(&self) -> &Arc<FrameListener> {
        &self.default_listener
    }

    /// Looks a listener up by name.
    pub fn listener(&self, name: &str) -> Option<Arc<FrameListener>> {
        self.listeners.find(name)
    }

    /// Returns the listener called `name`, creating it if needed.
    pub fn add_listener(&self, name: impl Into<String>) -> Arc<FrameListener> {
        self.listeners.add(name.into(), ())
    }

    /// Removes a listener, discarding its pending events.
    ///
    /// The default listener cannot be removed.
    pub fn remove_listener(&self, name: &str) -> Option<Arc<FrameListener>> {
        if name == self.default_listener.name() {
            log::warn!("Refusing to remove the default frame listener '{name}'");
            return None;
        }
        let listener = self.listeners.remove(name)?;
        listener.flush();
        Some(listener)
    }

    /// Queues `event` on the default listener.
    pub fn post_event(&self, event: FrameEvent) {
        self.default_listener.post_event(event);
    }

    /// Fires `phase` on every listener. Returns `false` if any event failed.
    pub fn fire_events(&self, phase: Phase) -> bool {
        let mut result = true;
        // Snapshot first: events may add or remove listeners while they run.
        for listener in self.listeners.elements() {
            result &= listener.fire_events(phase);
        }
        result
    }

    /// Runs every phase in pipeline order on every listener.
    /// Returns `false` if any event failed.
    pub fn render_frame(&self) -> bool {
        let frame = self.frame_count.fetch_add(1, Ordering::Relaxed) + 1;

        let mut result = true;
        for phase in Phase::ALL {
            result &= self.fire_events(phase);
        }

        if result {
            log::trace!("Frame {frame} processed.");
        } else {
            log::warn!("Frame {frame}: some deferred events failed.");
        }
        result
    }

    /// Number of frames processed by [`render_frame`](Self::render_frame).
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    /// Builds a cache whose elements are initialised and cleaned up through
    /// deferred events on the default listener, on the configured phases.
    pub fn resource_cache<E, A, P>(&self, producer: P) -> Cache<E, String, A>
    where
        E: CacheElement + Initialise + Cleanup,
        A: 'static,
        P: Fn(&String, A) -> E + Send + Sync + 'static,
    {
        Cache::new(self.context.clone(), producer)
            .with_initialiser(deferred_initialiser(
                self.default_listener.clone(),
                self.context.initialise_phase(),
            ))
            .with_cleaner(deferred_cleaner(
                self.default_listener.clone(),
                self.context.cleanup_phase(),
            ))
    }

    /// Discards the pending events of every listener. Returns how many were dropped.
    pub fn cleanup(&self) -> usize {
        self.listeners
            .elements()
            .iter()
            .map(|listener| listener.flush())
            .sum()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::info!("Engine is being dropped. Performing controlled shutdown...");

        let discarded = self.cleanup();
        if discarded > 0 {
            log::debug!("Discarded {discarded} pending frame event(s) at shutdown.");
        }
        self.listeners.clear();

        log::info!("Engine shutdown complete.");
    }
}
