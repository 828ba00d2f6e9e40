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

//! Collision policies for [`Cache::merge_into`].
//!
//! Each policy is a plain function usable as a merger, e.g.
//! `cache.with_merger(merge::overwrite)`.

use super::{Cache, CacheElement, CacheKey, RegistryGuard};
use std::sync::Arc;

/// Moves the element unless the destination already has the key, in which
/// case the destination element is kept and the incoming one is dropped.
pub fn keep_existing<E, K, A>(
    _source: &Cache<E, K, A>,
    destination: &mut RegistryGuard<'_, K, E>,
    key: &K,
    element: Arc<E>,
) where
    E: CacheElement,
    K: CacheKey,
{
    if destination.contains(key) {
        log::warn!("Duplicate {}: {}", E::TYPE_NAME, key);
        return;
    }
    destination.insert(key.clone(), element);
}

/// Moves the element, replacing whatever the destination stored under the key.
pub fn overwrite<E, K, A>(
    _source: &Cache<E, K, A>,
    destination: &mut RegistryGuard<'_, K, E>,
    key: &K,
    element: Arc<E>,
) where
    E: CacheElement,
    K: CacheKey,
{
    if destination.insert(key.clone(), element).is_some() {
        log::debug!("Replaced {}: {}", E::TYPE_NAME, key);
    }
}
