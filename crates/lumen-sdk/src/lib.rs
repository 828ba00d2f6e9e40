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

//! The public-facing SDK for the Lumen resource-lifecycle layer.
//!
//! [`Engine`] is the explicit root object: it owns the frame listeners,
//! hands out resource caches wired to them, and drives the per-frame phase
//! loop. Nothing here is a process-wide singleton.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod logging;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;

/// Everything an application usually needs.
pub mod prelude {
    pub use crate::{Engine, EngineConfig};
    pub use lumen_core::{
        Cache, CacheElement, CacheView, Cleanup, EngineContext, FrameEvent, FrameListener,
        Initialise, Phase,
    };
}
