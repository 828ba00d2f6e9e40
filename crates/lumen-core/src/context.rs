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

//! Read-only engine context shared by every cache.

use crate::event::Phase;

/// Engine-wide information that caches and hooks may query.
///
/// The context is created once by the engine root and shared through an
/// `Arc`. Nothing in this crate mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineContext {
    name: String,
    initialise_phase: Phase,
    cleanup_phase: Phase,
}

impl EngineContext {
    /// Creates a context with the default deferral phases
    /// ([`Phase::PreRender`] for initialisation, [`Phase::PostRender`] for cleanup).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initialise_phase: Phase::PreRender,
            cleanup_phase: Phase::PostRender,
        }
    }

    /// Overrides the phases on which deferred initialise and cleanup events are posted.
    pub fn with_phases(mut self, initialise: Phase, cleanup: Phase) -> Self {
        self.initialise_phase = initialise;
        self.cleanup_phase = cleanup;
        self
    }

    /// The engine name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase used for deferred GPU initialisation.
    pub fn initialise_phase(&self) -> Phase {
        self.initialise_phase
    }

    /// Phase used for deferred GPU cleanup.
    pub fn cleanup_phase(&self) -> Phase {
        self.cleanup_phase
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new("Lumen")
    }
}
