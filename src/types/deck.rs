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

use crate::types::id::DeckId;
use crate::types::timestamp::Timestamp;

/// A named collection of flashcards. Display metadata only.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub description: Option<String>,
    /// A CSS-style color, e.g. `#FFD700`.
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Deck {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        color: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let name = name.into().trim().to_string();
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self {
            id: DeckId::generate(&[&name], now),
            name,
            description,
            color: color.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
