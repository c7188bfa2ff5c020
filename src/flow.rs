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

//! Picks what kind of session to run given how the user feels and what is
//! waiting for them.

use serde::Serialize;

use crate::config::FlowLimits;
use crate::types::energy::EnergyLevel;
use crate::types::energy::StudyMode;

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub mode: StudyMode,
    /// How many cards to study in total.
    pub count: usize,
    pub message: String,
}

pub fn next_step(
    energy: EnergyLevel,
    pending_reviews: usize,
    new_cards_available: usize,
    limits: &FlowLimits,
) -> StudyPlan {
    match energy {
        EnergyLevel::Low => {
            let available = if pending_reviews > 0 {
                pending_reviews
            } else {
                new_cards_available
            };
            let count = available.min(limits.low_energy_limit);
            let message = if count > 0 {
                "Low energy. Let's take it slow with just a few cards.".to_string()
            } else {
                "No cards available right now. Get some rest!".to_string()
            };
            StudyPlan {
                mode: StudyMode::Light,
                count,
                message,
            }
        }
        EnergyLevel::Normal => {
            if pending_reviews > 0 {
                StudyPlan {
                    mode: StudyMode::Reviews,
                    count: pending_reviews.min(limits.review_limit),
                    message: format!("You have {pending_reviews} pending reviews. Let's review!"),
                }
            } else if new_cards_available > 0 {
                let count = new_cards_available.min(limits.new_card_limit);
                StudyPlan {
                    mode: StudyMode::Light,
                    count,
                    message: format!("Let's learn {count} new cards!"),
                }
            } else {
                StudyPlan {
                    mode: StudyMode::Light,
                    count: 0,
                    message: "Well done! You're all caught up.".to_string(),
                }
            }
        }
        EnergyLevel::High => {
            if pending_reviews + new_cards_available == 0 {
                return StudyPlan {
                    mode: StudyMode::Mixed,
                    count: 0,
                    message: "Nothing pending. You're on top of it!".to_string(),
                };
            }
            let review_count = pending_reviews.min(limits.review_limit);
            let new_count = new_cards_available.min(limits.new_card_limit);
            StudyPlan {
                mode: StudyMode::Mixed,
                count: (review_count + new_count).min(limits.mixed_limit),
                message: format!(
                    "High energy! Going all in: {review_count} reviews + {new_count} new cards!"
                ),
            }
        }
    }
}

pub fn streak_message(streak: usize) -> String {
    match streak {
        0 => "Start your streak today!".to_string(),
        1 => "First day done! Keep it up.".to_string(),
        2..7 => format!("{streak} days of focus! You're building a habit."),
        7..30 => format!("{streak} days! Your focus is getting strong."),
        30..100 => format!("{streak} days! You're unstoppable!"),
        _ => format!("{streak} days! Legendary."),
    }
}

/// Suggest a break in the first five minutes of every 25-minute block.
pub fn should_take_break(study_minutes: u64) -> bool {
    study_minutes > 0 && study_minutes % 25 < 5
}
