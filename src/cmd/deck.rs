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
use crate::srs::count_due;
use crate::srs::select_new;
use crate::types::deck::Deck;
use crate::types::id::DeckId;

pub fn add_deck(
    coll: &Collection,
    clock: &dyn Clock,
    name: &str,
    description: Option<String>,
    color: Option<String>,
) -> Fallible<Deck> {
    if name.trim().is_empty() {
        return fail("deck name is empty.");
    }
    let color = color.unwrap_or_else(|| coll.config.cards.default_deck_color.clone());
    let deck = Deck::new(name, description, color, clock.now());
    coll.db.create_deck(&deck)?;
    Ok(deck)
}

pub struct DeckSummary {
    pub deck: Deck,
    pub card_count: usize,
    pub due_count: usize,
    pub new_count: usize,
}

pub fn list_decks(coll: &Collection, clock: &dyn Clock) -> Fallible<Vec<DeckSummary>> {
    let now = clock.now();
    let mut summaries = Vec::new();
    for deck in coll.db.get_all_decks()? {
        let cards = coll.db.get_flashcards_by_deck(&deck.id)?;
        summaries.push(DeckSummary {
            card_count: cards.len(),
            due_count: count_due(&cards, now),
            new_count: select_new(&cards).len(),
            deck,
        });
    }
    Ok(summaries)
}

pub fn delete_deck(coll: &Collection, id: &DeckId) -> Fallible<()> {
    coll.db.delete_deck(id)
}

pub fn print_decks(summaries: &[DeckSummary]) {
    if summaries.is_empty() {
        println!("No decks.");
        return;
    }
    for s in summaries {
        println!(
            "{}  {} ({} cards, {} due, {} new)",
            s.deck.id, s.deck.name, s.card_count, s.due_count, s.new_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::helper::create_tmp_collection;
    use crate::helper::open_collection;
    use crate::srs::NewCardPolicy;
    use crate::srs::new_card;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_add_and_list() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let clock = FixedClock(Timestamp::from_millis(1_000)?);
        let deck = add_deck(&coll, &clock, "Rust", None, None)?;
        assert_eq!(deck.color, "#FFD700");
        let due = new_card(deck.id.clone(), "q1", "a1", clock.now(), NewCardPolicy::Immediate);
        let new = new_card(deck.id.clone(), "q2", "a2", clock.now(), NewCardPolicy::Unscheduled);
        coll.db.create_flashcard(&due)?;
        coll.db.create_flashcard(&new)?;

        let summaries = list_decks(&coll, &clock)?;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].deck, deck);
        assert_eq!(summaries[0].card_count, 2);
        assert_eq!(summaries[0].due_count, 1);
        assert_eq!(summaries[0].new_count, 1);
        Ok(())
    }

    #[test]
    fn test_empty_name() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let clock = FixedClock(Timestamp::from_millis(0)?);
        assert!(add_deck(&coll, &clock, "  ", None, None).is_err());
        Ok(())
    }

    #[test]
    fn test_delete() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let clock = FixedClock(Timestamp::from_millis(0)?);
        let deck = add_deck(&coll, &clock, "Rust", None, Some("#000000".to_string()))?;
        delete_deck(&coll, &deck.id)?;
        assert!(list_decks(&coll, &clock)?.is_empty());
        Ok(())
    }
}
