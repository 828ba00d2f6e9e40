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

//! Named resource caches with create-or-get semantics.
//!
//! A [`Cache`] maps keys to shared [`Arc`] handles and customizes the
//! lifecycle of its elements through four hooks: a producer building new
//! elements, an initialiser and a cleaner (usually posting deferred
//! [`FrameEvent`](crate::event::FrameEvent)s), and a merger resolving
//! collisions when one cache is merged into another.
//!
//! A [`CacheView`] wraps a shared cache for one consumer (a scene, a window)
//! and tracks the keys created through it, so that consumer can tear down
//! what it introduced without touching anybody else's resources.

mod hooks;
pub mod merge;
mod registry;
mod resource_cache;
mod view;

pub use hooks::{deferred_cleaner, deferred_initialiser, Cleaner, Initialiser, Merger, Producer};
pub use registry::{NamedRegistry, RegistryGuard};
pub use resource_cache::Cache;
pub use view::CacheView;

use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

/// A resource that can be stored in a [`Cache`].
pub trait CacheElement: Send + Sync + 'static {
    /// Human-readable type name used in log lines (e.g. `"Material"`).
    const TYPE_NAME: &'static str;

    /// The element's stable name. Must match the key it is stored under.
    fn name(&self) -> &str;
}

/// Requirements on cache keys.
pub trait CacheKey: Eq + Hash + Clone + Display + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + Display + Send + Sync + 'static {}

/// The outcome of inserting into a [`Cache`].
#[derive(Debug)]
pub enum Insertion<E> {
    /// The key was absent and this call stored the element.
    Created(Arc<E>),
    /// The key was already present; this is the element stored under it.
    Existing(Arc<E>),
}

impl<E> Insertion<E> {
    /// Returns `true` if this call created the entry.
    pub fn is_created(&self) -> bool {
        matches!(self, Insertion::Created(_))
    }

    /// The element now stored under the key.
    pub fn element(&self) -> &Arc<E> {
        match self {
            Insertion::Created(element) | Insertion::Existing(element) => element,
        }
    }

    /// Consumes the outcome, returning the stored element.
    pub fn into_inner(self) -> Arc<E> {
        match self {
            Insertion::Created(element) | Insertion::Existing(element) => element,
        }
    }
}
