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
use crate::srs::new_card;
use crate::types::flashcard::Flashcard;
use crate::types::id::CardId;
use crate::types::id::DeckId;

/// Add a card to a deck, scheduled according to the collection's new card
/// policy.
pub fn add_card(
    coll: &Collection,
    clock: &dyn Clock,
    deck_id: &DeckId,
    front: &str,
    back: &str,
) -> Fallible<Flashcard> {
    if front.trim().is_empty() || back.trim().is_empty() {
        return fail("card front and back must not be empty.");
    }
    let policy = coll.config.cards.new_card_policy;
    let card = new_card(deck_id.clone(), front, back, clock.now(), policy);
    coll.db.create_flashcard(&card)?;
    Ok(card)
}

pub fn list_cards(coll: &Collection, deck_id: Option<&DeckId>) -> Fallible<Vec<Flashcard>> {
    match deck_id {
        Some(deck_id) => {
            if coll.db.get_deck(deck_id)?.is_none() {
                return fail(format!("no deck with ID {deck_id}"));
            }
            coll.db.get_flashcards_by_deck(deck_id)
        }
        None => coll.db.get_all_flashcards(),
    }
}

/// Replace a card's text. Fields left as `None` keep their current value.
pub fn edit_card(
    coll: &Collection,
    clock: &dyn Clock,
    id: &CardId,
    front: Option<String>,
    back: Option<String>,
) -> Fallible<Flashcard> {
    let Some(card) = coll.db.get_flashcard(id)? else {
        return fail(format!("no card with ID {id}"));
    };
    let front = front.unwrap_or(card.front);
    let back = back.unwrap_or(card.back);
    if front.trim().is_empty() || back.trim().is_empty() {
        return fail("card front and back must not be empty.");
    }
    coll.db
        .update_flashcard_content(id, &front, &back, clock.now())?;
    match coll.db.get_flashcard(id)? {
        Some(card) => Ok(card),
        None => fail(format!("card {id} vanished during edit")),
    }
}

pub fn delete_card(coll: &Collection, id: &CardId) -> Fallible<()> {
    coll.db.delete_flashcard(id)
}

pub fn print_cards(cards: &[Flashcard]) {
    if cards.is_empty() {
        println!("No cards.");
        return;
    }
    for card in cards {
        let due = match card.next_review_at {
            Some(ts) => ts.to_string(),
            None => "new".to_string(),
        };
        println!("{}  [{}]  {} / {}", card.id, due, card.front, card.back);
    }
}
