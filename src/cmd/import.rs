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
use walkdir::WalkDir;

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::srs::new_card;
use crate::types::deck::Deck;
use crate::types::flashcard::Flashcard;

/// A deck file: one deck and its cards, in TOML.
///
/// ```toml
/// name = "Rust"
/// description = "The borrow checker and friends"
/// color = "#DEA584"
///
/// [[cards]]
/// front = "What does `&mut` guarantee?"
/// back = "Exclusive access for the borrow's lifetime."
/// ```
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeckFile {
    name: String,
    description: Option<String>,
    color: Option<String>,
    #[serde(default)]
    cards: Vec<CardEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CardEntry {
    front: String,
    back: String,
}

#[derive(PartialEq, Debug, Default)]
pub struct ImportSummary {
    pub decks: usize,
    pub cards: usize,
}

/// Import every `*.toml` deck file under `source`. Files are parsed and
/// validated up front, and everything is written in one transaction, so a
/// failed import leaves the collection unchanged.
pub fn import_decks(coll: &Collection, clock: &dyn Clock, source: &Path) -> Fallible<ImportSummary> {
    if !source.exists() {
        return fail("import directory does not exist.");
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            log::debug!("Reading deck file {}", path.display());
            let deck_file: DeckFile = toml::from_str(&read_to_string(path)?)?;
            validate(&deck_file, path)?;
            files.push(deck_file);
        }
    }

    let now = clock.now();
    let policy = coll.config.cards.new_card_policy;
    let mut summary = ImportSummary::default();
    let mut decks = Vec::new();
    for file in files {
        let color = file
            .color
            .unwrap_or_else(|| coll.config.cards.default_deck_color.clone());
        let deck = Deck::new(file.name, file.description, color, now);
        let cards: Vec<Flashcard> = file
            .cards
            .into_iter()
            .map(|entry| new_card(deck.id.clone(), entry.front, entry.back, now, policy))
            .collect();
        summary.decks += 1;
        summary.cards += cards.len();
        decks.push((deck, cards));
    }
    coll.db.create_decks_with_cards(&decks)?;
    log::info!("Imported {} decks, {} cards.", summary.decks, summary.cards);
    Ok(summary)
}

fn validate(file: &DeckFile, path: &Path) -> Fallible<()> {
    if file.name.trim().is_empty() {
        return fail(format!("{}: deck name is empty.", path.display()));
    }
    for (i, card) in file.cards.iter().enumerate() {
        if card.front.trim().is_empty() || card.back.trim().is_empty() {
            return fail(format!("{}: card {} has an empty side.", path.display(), i + 1));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::clock::FixedClock;
    use crate::helper::create_tmp_collection;
    use crate::helper::open_collection;
    use crate::types::timestamp::Timestamp;

    const RUST: &str = r##"
name = "Rust"
color = "#DEA584"

[[cards]]
front = "What does &mut guarantee?"
back = "Exclusive access."

[[cards]]
front = "What is a lifetime?"
back = "The region a reference is valid for."
"##;

    const MATH: &str = r#"
name = "Math"
description = "Basics"

[[cards]]
front = "Area of a triangle?"
back = "base * height / 2"
"#;

    #[test]
    fn test_import() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let source = tempdir()?;
        write(source.path().join("rust.toml"), RUST)?;
        create_dir_all(source.path().join("nested"))?;
        write(source.path().join("nested").join("math.toml"), MATH)?;
        write(source.path().join("notes.md"), "not a deck")?;

        let clock = FixedClock(Timestamp::from_millis(0)?);
        let summary = import_decks(&coll, &clock, source.path())?;
        assert_eq!(summary, ImportSummary { decks: 2, cards: 3 });

        let decks = coll.db.get_all_decks()?;
        let math = decks.iter().find(|d| d.name == "Math");
        assert_eq!(math.map(|d| d.color.as_str()), Some("#FFD700"));
        assert_eq!(math.and_then(|d| d.description.as_deref()), Some("Basics"));
        let cards = coll.db.get_all_flashcards()?;
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|c| c.is_new()));
        Ok(())
    }

    #[test]
    fn test_malformed_file_writes_nothing() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let source = tempdir()?;
        write(source.path().join("a.toml"), RUST)?;
        write(
            source.path().join("b.toml"),
            "name = \"Bad\"\n[[cards]]\nfront = \"q\"\nback = \" \"\n",
        )?;
        let clock = FixedClock(Timestamp::from_millis(0)?);
        assert!(import_decks(&coll, &clock, source.path()).is_err());
        assert!(coll.db.get_all_decks()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_directory() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        let clock = FixedClock(Timestamp::from_millis(0)?);
        assert!(import_decks(&coll, &clock, Path::new("./derpherp")).is_err());
        Ok(())
    }
}
