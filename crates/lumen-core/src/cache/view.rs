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

use super::hooks::{Cleaner, Initialiser};
use super::{Cache, CacheElement, CacheKey, Insertion};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A consumer-scoped window onto a shared [`Cache`].
///
/// Reads see every element of the underlying cache, but the view only
/// records the keys whose creation it caused. [`clear`](Self::clear) (and
/// dropping the view) removes and cleans those keys alone, leaving
/// elements created directly or through other views untouched.
///
/// Ownership is tied to the element, not only the key: if a key is removed
/// behind the view's back and re-created by someone else, the view no
/// longer touches it.
///
/// Removed elements are retained in a cleaning list until nothing else,
/// such as a pending cleanup event, still refers to them. Every
/// [`clear`](Self::clear) releases those, and
/// [`release_cleaned`](Self::release_cleaned) does it on demand.
pub struct CacheView<E, K = String, A = ()>
where
    E: CacheElement,
    K: CacheKey,
    A: 'static,
{
    cache: Arc<Cache<E, K, A>>,
    created: Mutex<Vec<(K, Weak<E>)>>,
    cleaning: Mutex<Vec<Arc<E>>>,
    initialiser: Option<Initialiser<E>>,
    cleaner: Option<Cleaner<E>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E, K, A> CacheView<E, K, A>
where
    E: CacheElement,
    K: CacheKey,
    A: 'static,
{
    /// Creates a view over `cache` that owns no key yet.
    pub fn new(cache: Arc<Cache<E, K, A>>) -> Self {
        Self {
            cache,
            created: Mutex::new(Vec::new()),
            cleaning: Mutex::new(Vec::new()),
            initialiser: None,
            cleaner: None,
        }
    }

    /// Sets a hook run on elements created through this view, after the
    /// cache's own initialiser.
    pub fn with_initialiser<F>(mut self, initialiser: F) -> Self
    where
        F: Fn(&Arc<E>) + Send + Sync + 'static,
    {
        self.initialiser = Some(Box::new(initialiser));
        self
    }

    /// Sets the hook run on this view's elements by [`clear`](Self::clear).
    /// Without one, the cache's cleaner is used.
    pub fn with_cleaner<F>(mut self, cleaner: F) -> Self
    where
        F: Fn(&Arc<E>) + Send + Sync + 'static,
    {
        self.cleaner = Some(Box::new(cleaner));
        self
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Arc<Cache<E, K, A>> {
        &self.cache
    }

    /// [`Cache::add`] through this view, recording `key` if this call created it.
    pub fn add(&self, key: K, args: A) -> Arc<E> {
        match self.cache.insert_with(key.clone(), args) {
            Insertion::Created(element) => {
                self.adopt(key, &element);
                element
            }
            Insertion::Existing(element) => element,
        }
    }

    /// [`Cache::add_element`] through this view, recording `key` if this call
    /// stored `element`.
    pub fn add_element(&self, key: K, element: Option<Arc<E>>) -> Option<Arc<E>> {
        let Some(element) = element else {
            log::warn!("Null {}", E::TYPE_NAME);
            return None;
        };

        match self.cache.insert(key.clone(), element) {
            Insertion::Created(element) => {
                self.adopt(key, &element);
                Some(element)
            }
            Insertion::Existing(element) => Some(element),
        }
    }

    fn adopt(&self, key: K, element: &Arc<E>) {
        {
            let mut created = lock(&self.created);
            match created.iter_mut().find(|(owned, _)| *owned == key) {
                Some((_, weak)) => *weak = Arc::downgrade(element),
                None => created.push((key, Arc::downgrade(element))),
            }
        }
        if let Some(initialiser) = &self.initialiser {
            initialiser(element);
        }
    }

    /// Returns `true` if the underlying cache holds `key`, whoever created it.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.has(key)
    }

    /// Looks `key` up in the underlying cache, whoever created it.
    pub fn find<Q>(&self, key: &Q) -> Option<Arc<E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.find(key)
    }

    /// Returns `true` if `key` was created through this view and not cleared since.
    pub fn owns<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        lock(&self.created)
            .iter()
            .any(|(owned, _)| Borrow::<Q>::borrow(owned) == key)
    }

    /// The keys this view created, in creation order.
    pub fn owned_keys(&self) -> Vec<K> {
        lock(&self.created)
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of keys this view owns.
    pub fn len(&self) -> usize {
        lock(&self.created).len()
    }

    /// Returns `true` if this view owns no key.
    pub fn is_empty(&self) -> bool {
        lock(&self.created).is_empty()
    }

    /// Removes every owned key from the underlying cache and cleans the
    /// removed elements.
    ///
    /// A key whose cached element is no longer the one this view created is
    /// forgotten without being removed. Retained elements whose cleanup has
    /// already run are released on the way out.
    pub fn clear(&self) {
        let owned = std::mem::take(&mut *lock(&self.created));
        let mut cleared = 0;

        for (key, created) in owned {
            let Some(element) = self.take_if_created(&key, &created) else {
                continue;
            };
            lock(&self.cleaning).push(element.clone());
            match &self.cleaner {
                Some(cleaner) => cleaner(&element),
                None => self.cache.clean(&element),
            }
            cleared += 1;
        }

        if cleared > 0 {
            log::debug!("CacheView cleared {} {}(s)", cleared, E::TYPE_NAME);
        }
        self.release_cleaned();
    }

    // Compare and remove under one lock so a concurrent re-creation is never taken.
    fn take_if_created(&self, key: &K, created: &Weak<E>) -> Option<Arc<E>> {
        let mut registry = self.cache.lock();
        let current = registry.get(key)?;
        if !std::ptr::eq(Arc::as_ptr(current), created.as_ptr()) {
            log::debug!(
                "{} '{}' was replaced outside the view, leaving it cached",
                E::TYPE_NAME,
                key
            );
            return None;
        }
        registry.remove(key)
    }

    /// Drops the retained elements that nothing else refers to any more.
    /// Returns how many were released.
    pub fn release_cleaned(&self) -> usize {
        let mut cleaning = lock(&self.cleaning);
        let before = cleaning.len();
        cleaning.retain(|element| Arc::strong_count(element) > 1);
        before - cleaning.len()
    }

    /// Number of removed elements still retained.
    pub fn cleaning_count(&self) -> usize {
        lock(&self.cleaning).len()
    }
}

impl<E, K, A> fmt::Debug for CacheView<E, K, A>
where
    E: CacheElement,
    K: CacheKey,
    A: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheView")
            .field("type", &E::TYPE_NAME)
            .field("owned", &self.len())
            .field("cleaning", &self.cleaning_count())
            .finish()
    }
}

impl<E, K, A> Drop for CacheView<E, K, A>
where
    E: CacheElement,
    K: CacheKey,
    A: 'static,
{
    fn drop(&mut self) {
        self.clear();
    }
}
