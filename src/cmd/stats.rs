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

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::flow::streak_message;
use crate::srs::count_due;
use crate::srs::select_new;
use crate::types::session::StudySession;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_cards: usize,
    pub cards_reviewed: usize,
    pub due_now: usize,
    pub new_cards: usize,
    pub current_streak: usize,
    pub longest_streak: usize,
    pub total_ideas: usize,
    pub study_minutes: i64,
}

pub fn compute_stats(coll: &Collection, clock: &dyn Clock) -> Fallible<UserStats> {
    let now = clock.now();
    let cards = coll.db.get_all_flashcards()?;
    let sessions = coll.db.get_all_sessions()?;
    let ideas = coll.db.get_all_ideas()?;
    let days: BTreeSet<NaiveDate> = sessions
        .iter()
        .filter(|s| s.cards_studied > 0)
        .map(|s| s.started_at.local_date())
        .collect();
    let (current_streak, longest_streak) = streaks(&days, now.local_date());
    Ok(UserStats {
        total_cards: cards.len(),
        cards_reviewed: sessions.iter().map(|s| s.cards_studied).sum(),
        due_now: count_due(&cards, now),
        new_cards: select_new(&cards).len(),
        current_streak,
        longest_streak,
        total_ideas: ideas.len(),
        study_minutes: sessions.iter().map(StudySession::minutes).sum(),
    })
}

/// The current and longest runs of consecutive study days.
///
/// The current streak is still alive if the user studied yesterday but not
/// yet today.
fn streaks(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> (usize, usize) {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let mut current = 0;
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        current += 1;
        cursor = day.pred_opt();
    }
    (current, longest)
}

pub fn print_stats(coll: &Collection, clock: &dyn Clock, format: StatsFormat) -> Fallible<()> {
    let stats = compute_stats(coll, clock)?;
    match format {
        StatsFormat::Text => {
            println!("Cards:          {}", stats.total_cards);
            println!("Due now:        {}", stats.due_now);
            println!("New:            {}", stats.new_cards);
            println!("Reviewed:       {}", stats.cards_reviewed);
            println!("Study minutes:  {}", stats.study_minutes);
            println!("Ideas:          {}", stats.total_ideas);
            println!("Longest streak: {}", stats.longest_streak);
            println!("{}", streak_message(stats.current_streak));
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}
