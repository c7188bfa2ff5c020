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

use crate::types::id::CardId;
use crate::types::id::DeckId;
use crate::types::timestamp::Timestamp;

/// A spaced repetition review unit.
///
/// The four scheduling fields (`interval_days`, `ease_factor`,
/// `repetition_count`, `next_review_at`) are only ever changed by
/// [`crate::srs::rate`]. Content edits leave them alone.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: CardId,
    pub deck_id: DeckId,
    pub front: String,
    pub back: String,
    /// The current spacing between reviews, in days.
    pub interval_days: f64,
    /// Controls how fast the interval grows. Always in `[1.3, 3.0]`.
    pub ease_factor: f64,
    /// How many times the card has been rated.
    pub repetition_count: u32,
    /// `None` if the card has never been scheduled.
    pub next_review_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Flashcard {
    /// True if the card has never been scheduled.
    pub fn is_new(&self) -> bool {
        self.next_review_at.is_none()
    }
}
