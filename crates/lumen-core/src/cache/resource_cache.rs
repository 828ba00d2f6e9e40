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

use super::hooks::{Cleaner, Initialiser, Merger, Producer};
use super::{merge, CacheElement, CacheKey, Insertion, NamedRegistry, RegistryGuard};
use crate::context::EngineContext;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A named registry of shared resources with pluggable lifecycle hooks.
///
/// `E` is the element type, `K` the key and `A` the producer's constructor
/// arguments. Every operation is lock-guarded, and creation (production,
/// initialisation and insertion) happens inside a single critical section, so
/// concurrent callers asking for the same key get the same element and the
/// producer runs once.
///
/// Duplicate keys and null elements are not errors: they are logged and the
/// call falls back to the stored element, or to `None`.
///
/// # Example
///
/// ```rust
/// use lumen_core::{Cache, CacheElement, EngineContext};
/// use std::sync::Arc;
///
/// struct Material { name: String }
///
/// impl CacheElement for Material {
///     const TYPE_NAME: &'static str = "Material";
///     fn name(&self) -> &str { &self.name }
/// }
///
/// let cache: Cache<Material> = Cache::new(Arc::new(EngineContext::default()), |name: &String, ()| {
///     Material { name: name.clone() }
/// });
///
/// let first = cache.add("bronze".to_string(), ());
/// let second = cache.add("bronze".to_string(), ());
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct Cache<E, K = String, A = ()> {
    context: Arc<EngineContext>,
    registry: NamedRegistry<K, E>,
    producer: Producer<E, K, A>,
    initialiser: Initialiser<E>,
    cleaner: Cleaner<E>,
    merger: Merger<E, K, A>,
}

impl<E, K, A> Cache<E, K, A>
where
    E: CacheElement,
    K: CacheKey,
    A: 'static,
{
    /// Creates an empty cache producing elements with `producer`.
    ///
    /// The initialiser and cleaner default to doing nothing and the merger to
    /// [`merge::keep_existing`].
    pub fn new<P>(context: Arc<EngineContext>, producer: P) -> Self
    where
        P: Fn(&K, A) -> E + Send + Sync + 'static,
    {
        Self {
            context,
            registry: NamedRegistry::new(),
            producer: Box::new(producer),
            initialiser: Box::new(|_| {}),
            cleaner: Box::new(|_| {}),
            merger: Box::new(merge::keep_existing::<E, K, A>),
        }
    }

    /// Sets the hook run on every element this cache produces, before it is stored.
    pub fn with_initialiser<F>(mut self, initialiser: F) -> Self
    where
        F: Fn(&Arc<E>) + Send + Sync + 'static,
    {
        self.initialiser = Box::new(initialiser);
        self
    }

    /// Sets the hook run on every element by [`cleanup`](Self::cleanup).
    pub fn with_cleaner<F>(mut self, cleaner: F) -> Self
    where
        F: Fn(&Arc<E>) + Send + Sync + 'static,
    {
        self.cleaner = Box::new(cleaner);
        self
    }

    /// Sets the collision policy used by [`merge_into`](Self::merge_into).
    pub fn with_merger<F>(mut self, merger: F) -> Self
    where
        F: Fn(&Cache<E, K, A>, &mut RegistryGuard<'_, K, E>, &K, Arc<E>) + Send + Sync + 'static,
    {
        self.merger = Box::new(merger);
        self
    }

    /// The engine context this cache belongs to.
    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    /// The element type name used in log lines.
    pub fn type_name(&self) -> &'static str {
        E::TYPE_NAME
    }

    /// Produces an element without storing it.
    pub fn create(&self, key: &K, args: A) -> Arc<E> {
        Arc::new((self.producer)(key, args))
    }

    /// Returns the element stored under `key`, producing, initialising and
    /// storing it first if the key is absent.
    pub fn add(&self, key: K, args: A) -> Arc<E> {
        self.insert_with(key, args).into_inner()
    }

    /// Stores `element` under `key` unless the key is taken.
    ///
    /// Returns the stored element: `element` itself, the element already
    /// present under `key` (the passed one is then dropped by the cache), or
    /// `None` when `element` is `None`.
    pub fn add_element(&self, key: K, element: Option<Arc<E>>) -> Option<Arc<E>> {
        match element {
            Some(element) => Some(self.insert(key, element).into_inner()),
            None => {
                log::warn!("Null {}", E::TYPE_NAME);
                None
            }
        }
    }

    /// Like [`add`](Self::add), reporting whether this call created the entry.
    pub fn insert_with(&self, key: K, args: A) -> Insertion<E> {
        let mut entries = self.registry.lock();
        if let Some(existing) = entries.get(&key) {
            log::warn!("Duplicate {}: {}", E::TYPE_NAME, key);
            return Insertion::Existing(existing.clone());
        }

        let element = Arc::new((self.producer)(&key, args));
        (self.initialiser)(&element);
        log::info!("Created {}: {}", E::TYPE_NAME, key);
        entries.insert(key, element.clone());
        Insertion::Created(element)
    }

    /// Like [`add_element`](Self::add_element) for a present element,
    /// reporting whether this call created the entry.
    pub fn insert(&self, key: K, element: Arc<E>) -> Insertion<E> {
        let key_name = key.to_string();
        if element.name() != key_name {
            log::warn!(
                "{} '{}' stored under mismatching key '{}'",
                E::TYPE_NAME,
                element.name(),
                key_name
            );
        }

        let mut entries = self.registry.lock();
        if let Some(existing) = entries.get(&key) {
            log::warn!("Duplicate {}: {}", E::TYPE_NAME, key_name);
            return Insertion::Existing(existing.clone());
        }

        entries.insert(key, element.clone());
        log::debug!("Added {}: {}", E::TYPE_NAME, key_name);
        Insertion::Created(element)
    }

    /// Erases the entry for `key`, returning it. The cleaner is not called.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let removed = self.registry.lock().remove(key);
        if removed.is_some() {
            log::debug!("Removed {}: {}", E::TYPE_NAME, key);
        }
        removed
    }

    /// Returns the element stored under `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<Arc<E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry.find(key)
    }

    /// Returns `true` if `key` is present.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry.contains(key)
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// A snapshot of the stored keys.
    pub fn keys(&self) -> Vec<K> {
        self.registry.lock().keys().cloned().collect()
    }

    /// A snapshot of the stored elements, usable without holding the lock.
    pub fn elements(&self) -> Vec<Arc<E>> {
        self.registry.lock().values().cloned().collect()
    }

    /// Runs the cleaner on every stored element, keeping them stored.
    pub fn cleanup(&self) {
        let entries = self.registry.lock();
        log::debug!("Cleaning up {} {}(s)", entries.len(), E::TYPE_NAME);
        for element in entries.values() {
            (self.cleaner)(element);
        }
    }

    /// Drops every entry without running the cleaner.
    pub fn clear(&self) {
        let drained: Vec<_> = self.registry.lock().drain().collect();
        if !drained.is_empty() {
            log::debug!("Cleared {} {}(s)", drained.len(), E::TYPE_NAME);
        }
    }

    /// Hands every entry of this cache to the merger against `other`'s
    /// registry, then leaves this cache empty.
    ///
    /// Both locks are held for the whole merge. They are always acquired in
    /// address order, so two opposite merges running concurrently cannot
    /// deadlock.
    pub fn merge_into(&self, other: &Cache<E, K, A>) {
        if std::ptr::eq(self, other) {
            log::warn!("Ignoring merge of a {} cache into itself", E::TYPE_NAME);
            return;
        }

        let (mut source, mut destination) = if (self as *const Self) < (other as *const Self) {
            let source = self.registry.lock();
            (source, other.registry.lock())
        } else {
            let destination = other.registry.lock();
            (self.registry.lock(), destination)
        };

        let count = source.len();
        for (key, element) in source.drain() {
            (self.merger)(self, &mut destination, &key, element);
        }
        log::debug!("Merged {} {}(s)", count, E::TYPE_NAME);
    }

    /// Calls `f` on every entry with the lock held. `f` must not call back
    /// into this cache.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &Arc<E>),
    {
        for (key, element) in self.registry.lock().iter() {
            f(key, element);
        }
    }

    /// Locks the registry for a caller-side composite operation.
    pub fn lock(&self) -> RegistryGuard<'_, K, E> {
        self.registry.lock()
    }

    /// Runs the cleaner on a single element.
    pub(crate) fn clean(&self, element: &Arc<E>) {
        (self.cleaner)(element);
    }
}

impl<E, K, A> fmt::Debug for Cache<E, K, A>
where
    E: CacheElement,
    K: CacheKey,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("type", &E::TYPE_NAME)
            .field("context", &self.context.name())
            .field("len", &self.registry.len())
            .finish()
    }
}
