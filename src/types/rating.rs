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

use std::fmt::Display;
use std::fmt::Formatter;

/// The user's self-assessed recall quality after seeing a card's answer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Rating {
    Easy,
    Medium,
    Hard,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Easy => "easy",
            Rating::Medium => "medium",
            Rating::Hard => "hard",
        }
    }

    /// The factor a reviewed card's interval is multiplied by.
    pub fn multiplier(self) -> f64 {
        match self {
            Rating::Easy => 2.5,
            Rating::Medium => 1.5,
            Rating::Hard => 1.1,
        }
    }

    /// Parse the single-key shorthand used by the study prompt.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "e" | "easy" => Some(Rating::Easy),
            "m" | "medium" => Some(Rating::Medium),
            "h" | "hard" => Some(Rating::Hard),
            _ => None,
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
