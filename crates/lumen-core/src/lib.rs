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

//! # Lumen Core
//!
//! Resource-lifecycle coordination for the engine: named resource caches with
//! pluggable lifecycle hooks, and per-listener queues of deferred frame events
//! drained by the render thread at fixed points of the frame pipeline.

#![warn(missing_docs)]

pub mod cache;
pub mod context;
pub mod event;

pub use cache::{Cache, CacheElement, CacheView, Insertion, NamedRegistry, RegistryGuard};
pub use context::EngineContext;
pub use event::{Cleanup, EventError, EventKind, FrameEvent, FrameListener, Initialise, Phase};
