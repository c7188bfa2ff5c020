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
use crate::types::flashcard::Flashcard;

/// The cards due now, most overdue first.
pub fn due_cards(coll: &Collection, clock: &dyn Clock) -> Fallible<Vec<Flashcard>> {
    coll.db.get_all_flashcards_due(clock.now())
}

pub fn print_due(coll: &Collection, clock: &dyn Clock) -> Fallible<()> {
    let cards = due_cards(coll, clock)?;
    if cards.is_empty() {
        println!("No cards due.");
        return Ok(());
    }
    for card in &cards {
        println!("{}  {}", card.id, card.front);
    }
    println!("{} cards due.", cards.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::helper::create_tmp_collection;
    use crate::helper::open_collection;
    use crate::srs::NewCardPolicy;
    use crate::srs::new_card;
    use crate::srs::select_due;
    use crate::types::deck::Deck;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_store_query_agrees_with_scheduler() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let t0 = Timestamp::from_millis(1_000)?;
        let deck = Deck::new("Rust", None, "#FFD700", t0);
        coll.db.create_deck(&deck)?;
        for (i, offset) in [Some(-5), Some(0), Some(5), None].into_iter().enumerate() {
            let mut card = new_card(
                deck.id.clone(),
                format!("q{i}"),
                "a",
                t0,
                NewCardPolicy::Unscheduled,
            );
            if let Some(offset) = offset {
                card.next_review_at = Some(Timestamp::from_millis(10_000 + offset)?);
            }
            coll.db.create_flashcard(&card)?;
        }
        let clock = FixedClock(Timestamp::from_millis(10_000)?);
        let from_store = due_cards(&coll, &clock)?;
        let mut from_scheduler = select_due(&coll.db.get_all_flashcards()?, clock.now());
        from_scheduler.sort_by_key(|c| c.next_review_at);
        assert_eq!(from_store, from_scheduler);
        assert_eq!(from_store.len(), 2);
        Ok(())
    }
}
