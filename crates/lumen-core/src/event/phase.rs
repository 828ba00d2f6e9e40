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

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point of the render pipeline at which a listener bucket is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Before any render work is recorded for the frame.
    PreRender,
    /// While render queues are being built.
    QueueRender,
    /// After the frame has been submitted.
    PostRender,
}

impl Phase {
    /// Number of phases.
    pub const COUNT: usize = 3;

    /// Every phase, in pipeline order.
    pub const ALL: [Phase; Phase::COUNT] = [Phase::PreRender, Phase::QueueRender, Phase::PostRender];

    /// Position of the phase in pipeline order.
    pub const fn index(self) -> usize {
        match self {
            Phase::PreRender => 0,
            Phase::QueueRender => 1,
            Phase::PostRender => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PreRender => write!(f, "PreRender"),
            Phase::QueueRender => write!(f, "QueueRender"),
            Phase::PostRender => write!(f, "PostRender"),
        }
    }
}
