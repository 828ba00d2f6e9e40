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

use std::borrow::Borrow;
use std::collections::hash_map::{Drain, Iter, Keys, Values};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A lock-guarded map from keys to shared element handles.
///
/// Single lookups can go through the one-shot helpers; anything that must
/// observe and mutate the map atomically takes the [`RegistryGuard`] from
/// [`lock`](Self::lock) and works on it.
pub struct NamedRegistry<K, E> {
    entries: Mutex<HashMap<K, Arc<E>>>,
}

impl<K: Eq + Hash, E> NamedRegistry<K, E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the registry lock.
    ///
    /// The map is only mutated by single inserts and removals, so a lock
    /// poisoned by a panicking hook is recovered rather than propagated.
    pub fn lock(&self) -> RegistryGuard<'_, K, E> {
        RegistryGuard {
            entries: self.entries.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Returns the element stored under `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<Arc<E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().get(key).cloned()
    }

    /// Returns `true` if `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().contains(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the registry holds no entry.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<K: Eq + Hash, E> Default for NamedRegistry<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, E> fmt::Debug for NamedRegistry<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Exclusive access to a [`NamedRegistry`]'s map. The lock is released on drop.
pub struct RegistryGuard<'a, K, E> {
    entries: MutexGuard<'a, HashMap<K, Arc<E>>>,
}

impl<K: Eq + Hash, E> RegistryGuard<'_, K, E> {
    /// Returns the element stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&Arc<E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Stores `element` under `key`, returning the element it replaced.
    pub fn insert(&mut self, key: K, element: Arc<E>) -> Option<Arc<E>> {
        self.entries.insert(key, element)
    }

    /// Removes and returns the element stored under `key`.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Arc<E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, element)` pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, Arc<E>> {
        self.entries.iter()
    }

    /// Iterates over keys in arbitrary order.
    pub fn keys(&self) -> Keys<'_, K, Arc<E>> {
        self.entries.keys()
    }

    /// Iterates over elements in arbitrary order.
    pub fn values(&self) -> Values<'_, K, Arc<E>> {
        self.entries.values()
    }

    /// Removes every entry, yielding them.
    pub fn drain(&mut self) -> Drain<'_, K, Arc<E>> {
        self.entries.drain()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
