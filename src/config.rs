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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::srs::NewCardPolicy;

/// The name of the optional configuration file in a collection directory.
pub const CONFIG_FILE_NAME: &str = "mindvault.toml";

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cards: CardsConfig,
    pub flow: FlowLimits,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardsConfig {
    pub new_card_policy: NewCardPolicy,
    pub default_deck_color: String,
}

/// Caps on how many cards the flow engine hands out per session.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowLimits {
    /// Cards in a low-energy session.
    pub low_energy_limit: usize,
    /// Due reviews in a normal or high-energy session.
    pub review_limit: usize,
    /// New cards in a normal or high-energy session.
    pub new_card_limit: usize,
    /// Total cards in a high-energy session.
    pub mixed_limit: usize,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            new_card_policy: NewCardPolicy::Unscheduled,
            default_deck_color: "#FFD700".to_string(),
        }
    }
}

impl Default for FlowLimits {
    fn default() -> Self {
        Self {
            low_energy_limit: 5,
            review_limit: 20,
            new_card_limit: 10,
            mixed_limit: 30,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Fallible<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the configuration from a collection directory. A missing file
    /// yields the defaults.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE_NAME}, using defaults.");
            return Ok(Self::default());
        }
        log::debug!("Loading configuration from {}", path.display());
        Self::parse(&read_to_string(path)?)
    }
}
