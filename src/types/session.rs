// Copyright 2025 Fernando Borretti
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

use serde::Serialize;

use crate::types::energy::EnergyLevel;
use crate::types::energy::StudyMode;
use crate::types::id::SessionId;
use crate::types::timestamp::Timestamp;

/// A completed (or abandoned) study session.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: SessionId,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub cards_studied: usize,
    pub mode: StudyMode,
    pub energy_level: EnergyLevel,
}

impl StudySession {
    /// Whole minutes between start and end. Zero for unfinished sessions.
    pub fn minutes(&self) -> i64 {
        match self.ended_at {
            Some(ended_at) => ended_at.duration_since(self.started_at).num_minutes().max(0),
            None => 0,
        }
    }
}
