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

//! Deferred frame events and the listeners that queue them per pipeline phase.
//!
//! Producer threads post [`FrameEvent`]s to a [`FrameListener`]; the render
//! thread drains one phase bucket at a time with
//! [`FrameListener::fire_events`], so GPU-bound work always runs on the thread
//! owning the GPU context.

mod error;
mod frame_event;
mod listener;
mod phase;

pub use error::EventError;
pub use frame_event::{Cleanup, EventKind, FrameEvent, Initialise};
pub use listener::FrameListener;
pub use phase::Phase;
