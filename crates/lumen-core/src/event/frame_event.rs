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

use super::{EventError, Phase};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A resource whose GPU-side state is prepared by a deferred event.
pub trait Initialise: Send + Sync {
    /// Creates the GPU-side state. Runs on the render thread.
    fn initialise(&self) -> anyhow::Result<()>;
}

/// A resource whose GPU-side state is released by a deferred event.
pub trait Cleanup: Send + Sync {
    /// Releases the GPU-side state. Runs on the render thread.
    fn cleanup(&self);
}

/// The finite set of things a [`FrameEvent`] can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Calls [`Initialise::initialise`] on its target.
    Initialise,
    /// Calls [`Cleanup::cleanup`] on its target.
    Cleanup,
    /// Runs an arbitrary closure.
    Functor,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Initialise => write!(f, "Initialise"),
            EventKind::Cleanup => write!(f, "Cleanup"),
            EventKind::Functor => write!(f, "Functor"),
        }
    }
}

type Functor = Box<dyn FnOnce() -> anyhow::Result<bool> + Send>;

enum Action {
    Initialise(Arc<dyn Initialise>),
    Cleanup(Arc<dyn Cleanup>),
    Functor(Functor),
}

impl Action {
    fn kind(&self) -> EventKind {
        match self {
            Action::Initialise(_) => EventKind::Initialise,
            Action::Cleanup(_) => EventKind::Cleanup,
            Action::Functor(_) => EventKind::Functor,
        }
    }

    fn run(self) -> anyhow::Result<bool> {
        match self {
            Action::Initialise(target) => target.initialise().map(|()| true),
            Action::Cleanup(target) => {
                target.cleanup();
                Ok(true)
            }
            Action::Functor(functor) => functor(),
        }
    }
}

/// A unit of deferred work tagged with the pipeline phase it must run in.
///
/// Events hold their target by `Arc`, so a resource cannot be dropped while an
/// event aimed at it is still queued. An event is consumed by
/// [`apply`](Self::apply) and therefore runs at most once.
pub struct FrameEvent {
    phase: Phase,
    action: Action,
}

impl FrameEvent {
    /// Creates an event initialising `target` during `phase`.
    pub fn initialise<T: Initialise + 'static>(phase: Phase, target: Arc<T>) -> Self {
        Self {
            phase,
            action: Action::Initialise(target),
        }
    }

    /// Creates an event cleaning up `target` during `phase`.
    pub fn cleanup<T: Cleanup + 'static>(phase: Phase, target: Arc<T>) -> Self {
        Self {
            phase,
            action: Action::Cleanup(target),
        }
    }

    /// Creates an event running `functor` during `phase`.
    ///
    /// Returning `Ok(false)` marks the event as failed without an error value.
    pub fn functor<F>(phase: Phase, functor: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<bool> + Send + 'static,
    {
        Self {
            phase,
            action: Action::Functor(Box::new(functor)),
        }
    }

    /// The phase this event is queued for.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Retags the event. Only meaningful before it is posted.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Builder form of [`set_phase`](Self::set_phase).
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// What the event does.
    pub fn kind(&self) -> EventKind {
        self.action.kind()
    }

    /// Runs the event, consuming it.
    ///
    /// A declined outcome, a returned error and a panic are all reported as
    /// an [`EventError`]; a panic never unwinds past this call.
    pub fn apply(self) -> Result<(), EventError> {
        let kind = self.kind();
        let action = self.action;

        match panic::catch_unwind(AssertUnwindSafe(move || action.run())) {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(EventError::Declined { kind }),
            Ok(Err(source)) => Err(EventError::Failed { kind, source }),
            Err(payload) => Err(EventError::Panicked {
                kind,
                message: panic_message(payload),
            }),
        }
    }
}

impl fmt::Debug for FrameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameEvent")
            .field("phase", &self.phase)
            .field("kind", &self.kind())
            .finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
