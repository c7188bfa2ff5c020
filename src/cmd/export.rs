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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::deck::Deck;
use crate::types::flashcard::Flashcard;
use crate::types::idea::Idea;
use crate::types::session::StudySession;

pub fn export_collection(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let export: Export = get_export(&coll)?;
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    decks: Vec<DeckExport>,
    ideas: Vec<Idea>,
    sessions: Vec<StudySession>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckExport {
    #[serde(flatten)]
    deck: Deck,
    cards: Vec<Flashcard>,
}

fn get_export(coll: &Collection) -> Fallible<Export> {
    let mut decks: Vec<DeckExport> = Vec::new();
    for deck in coll.db.get_all_decks()? {
        let cards = coll.db.get_flashcards_by_deck(&deck.id)?;
        decks.push(DeckExport { deck, cards });
    }
    Ok(Export {
        decks,
        ideas: coll.db.get_all_ideas()?,
        sessions: coll.db.get_all_sessions()?,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::helper::create_tmp_collection;
    use crate::helper::open_collection;
    use crate::srs::NewCardPolicy;
    use crate::srs::new_card;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_export_shape() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let now = Timestamp::from_millis(1_700_000_000_000)?;
        let deck = Deck::new("Rust", Some("Ownership".to_string()), "#FFD700", now);
        coll.db.create_deck(&deck)?;
        let card = new_card(deck.id.clone(), "q", "a", now, NewCardPolicy::Unscheduled);
        coll.db.create_flashcard(&card)?;

        let json = serde_json::to_value(get_export(&coll)?)?;
        let exported_deck = &json["decks"][0];
        assert_eq!(exported_deck["name"], Value::from("Rust"));
        assert_eq!(exported_deck["description"], Value::from("Ownership"));
        assert_eq!(exported_deck["createdAt"], Value::from(1_700_000_000_000_i64));
        let exported_card = &exported_deck["cards"][0];
        assert_eq!(exported_card["id"], Value::from(card.id.to_string()));
        assert_eq!(exported_card["deckId"], Value::from(deck.id.to_string()));
        assert_eq!(exported_card["intervalDays"], Value::from(0.0));
        assert_eq!(exported_card["easeFactor"], Value::from(2.5));
        assert_eq!(exported_card["repetitionCount"], Value::from(0));
        assert_eq!(exported_card["nextReviewAt"], Value::Null);
        assert_eq!(json["ideas"], Value::Array(Vec::new()));
        assert_eq!(json["sessions"], Value::Array(Vec::new()));
        Ok(())
    }
}
