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

//! Lifecycle hook signatures and the deferred-event hook builders.

use super::{Cache, RegistryGuard};
use crate::event::{Cleanup, FrameEvent, FrameListener, Initialise, Phase};
use std::sync::Arc;

/// Builds an element from its key and constructor arguments. Must not touch the GPU.
pub type Producer<E, K, A> = Box<dyn Fn(&K, A) -> E + Send + Sync>;

/// Prepares a freshly produced element for use.
pub type Initialiser<E> = Box<dyn Fn(&Arc<E>) + Send + Sync>;

/// Releases an element's GPU-side state.
pub type Cleaner<E> = Box<dyn Fn(&Arc<E>) + Send + Sync>;

/// Moves one entry of a source cache into a destination registry.
///
/// Called with the source cache locked: it must not call back into the source.
pub type Merger<E, K, A> =
    Box<dyn Fn(&Cache<E, K, A>, &mut RegistryGuard<'_, K, E>, &K, Arc<E>) + Send + Sync>;

/// An initialiser posting a [`FrameEvent::initialise`] for each new element to `listener`.
pub fn deferred_initialiser<E>(
    listener: Arc<FrameListener>,
    phase: Phase,
) -> impl Fn(&Arc<E>) + Send + Sync + 'static
where
    E: Initialise + 'static,
{
    move |element: &Arc<E>| listener.post_event(FrameEvent::initialise(phase, element.clone()))
}

/// A cleaner posting a [`FrameEvent::cleanup`] for each element to `listener`.
pub fn deferred_cleaner<E>(
    listener: Arc<FrameListener>,
    phase: Phase,
) -> impl Fn(&Arc<E>) + Send + Sync + 'static
where
    E: Cleanup + 'static,
{
    move |element: &Arc<E>| listener.post_event(FrameEvent::cleanup(phase, element.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Sampler {
        live: AtomicBool,
    }

    impl Initialise for Sampler {
        fn initialise(&self) -> anyhow::Result<()> {
            self.live.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Cleanup for Sampler {
        fn cleanup(&self) {
            self.live.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn hooks_defer_work_to_listener() {
        let listener = Arc::new(FrameListener::new("hooks"));
        let initialise = deferred_initialiser::<Sampler>(listener.clone(), Phase::PreRender);
        let cleanup = deferred_cleaner::<Sampler>(listener.clone(), Phase::PostRender);

        let sampler = Arc::new(Sampler::default());
        initialise(&sampler);
        assert!(!sampler.live.load(Ordering::SeqCst));
        assert_eq!(listener.pending(Phase::PreRender), 1);

        assert!(listener.fire_events(Phase::PreRender));
        assert!(sampler.live.load(Ordering::SeqCst));

        cleanup(&sampler);
        assert_eq!(listener.pending(Phase::PostRender), 1);
        assert!(listener.fire_events(Phase::PostRender));
        assert!(!sampler.live.load(Ordering::SeqCst));
    }
}
