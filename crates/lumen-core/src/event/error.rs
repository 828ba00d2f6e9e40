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

//! Errors produced while applying a frame event.

use super::EventKind;
use std::fmt;

/// The reason a [`FrameEvent`](super::FrameEvent) failed to apply.
///
/// These errors never escape [`FrameListener::fire_events`](super::FrameListener::fire_events);
/// they are logged there and folded into its boolean result.
#[derive(Debug)]
pub enum EventError {
    /// The event ran and reported that it did not complete.
    Declined {
        /// Kind of the failing event.
        kind: EventKind,
    },
    /// The event returned an error.
    Failed {
        /// Kind of the failing event.
        kind: EventKind,
        /// The underlying error.
        source: anyhow::Error,
    },
    /// The event panicked while being applied.
    Panicked {
        /// Kind of the failing event.
        kind: EventKind,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl EventError {
    /// Kind of the event that failed.
    pub fn kind(&self) -> EventKind {
        match self {
            EventError::Declined { kind }
            | EventError::Failed { kind, .. }
            | EventError::Panicked { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::Declined { kind } => write!(f, "{kind} event reported failure"),
            EventError::Failed { kind, source } => write!(f, "{kind} event failed: {source:#}"),
            EventError::Panicked { kind, message } => {
                write!(f, "{kind} event panicked: {message}")
            }
        }
    }
}

impl std::error::Error for EventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventError::Failed { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
