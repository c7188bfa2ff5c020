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

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::idea::EmotionalState;
use crate::types::idea::Idea;
use crate::types::idea::Priority;

pub fn add_idea(
    coll: &Collection,
    clock: &dyn Clock,
    title: &str,
    emotional_state: EmotionalState,
    vision_points: Vec<String>,
    priority: Priority,
    tags: Vec<String>,
) -> Fallible<Idea> {
    if title.trim().is_empty() {
        return fail("idea title is empty.");
    }
    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    let idea = Idea::new(
        title,
        emotional_state,
        clean(vision_points),
        priority,
        clean(tags),
        clock.now(),
    );
    coll.db.create_idea(&idea)?;
    Ok(idea)
}

pub fn print_ideas(coll: &Collection) -> Fallible<()> {
    let ideas = coll.db.get_all_ideas()?;
    if ideas.is_empty() {
        println!("No ideas.");
        return Ok(());
    }
    for idea in ideas {
        println!(
            "{}  [{} / {}]  {}",
            idea.id, idea.priority, idea.emotional_state, idea.title
        );
        for point in &idea.vision_points {
            println!("    - {point}");
        }
        if !idea.tags.is_empty() {
            println!("    tags: {}", idea.tags.join(", "));
        }
    }
    Ok(())
}
