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

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::types::Type;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::srs::check_schedule;
use crate::types::deck::Deck;
use crate::types::flashcard::Flashcard;
use crate::types::id::CardId;
use crate::types::id::DeckId;
use crate::types::id::IdeaId;
use crate::types::idea::Idea;
use crate::types::session::StudySession;
use crate::types::timestamp::Timestamp;

const DECK_COLUMNS: &str = "id, name, description, color, createdAt, updatedAt";

const FLASHCARD_COLUMNS: &str = "id, deckId, front, back, intervalDays, easeFactor, repetitionCount, nextReviewAt, createdAt, updatedAt";

const IDEA_COLUMNS: &str = "id, title, emotionalState, visionPoints, priority, tags, createdAt, updatedAt, lastAccessedAt";

const SESSION_COLUMNS: &str = "id, startedAt, endedAt, cardsStudied, mode, energyLevel";

/// The record store: decks, flashcards, ideas, and study sessions in a
/// single SQLite file.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &Path) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating schema in {}", database_path.display());
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    // Decks.

    pub fn create_deck(&self, deck: &Deck) -> Fallible<DeckId> {
        let conn = self.acquire()?;
        insert_deck(&conn, deck)?;
        Ok(deck.id.clone())
    }

    /// All decks, newest first.
    pub fn get_all_decks(&self) -> Fallible<Vec<Deck>> {
        let conn = self.acquire()?;
        let sql = format!("select {DECK_COLUMNS} from decks order by createdAt desc, id;");
        let mut stmt = conn.prepare(&sql)?;
        let decks = stmt
            .query_map([], deck_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decks)
    }

    pub fn get_deck(&self, id: &DeckId) -> Fallible<Option<Deck>> {
        let conn = self.acquire()?;
        let sql = format!("select {DECK_COLUMNS} from decks where id = ?;");
        let deck = conn.query_row(&sql, [id], deck_from_row).optional()?;
        Ok(deck)
    }

    /// Delete a deck and, by cascade, all of its cards.
    pub fn delete_deck(&self, id: &DeckId) -> Fallible<()> {
        let conn = self.acquire()?;
        let deleted = conn.execute("delete from decks where id = ?;", [id])?;
        if deleted == 0 {
            return fail(format!("no deck with ID {id}"));
        }
        log::debug!("Deleted deck {id}");
        Ok(())
    }

    // Flashcards.

    pub fn create_flashcard(&self, card: &Flashcard) -> Fallible<CardId> {
        let conn = self.acquire()?;
        insert_flashcard(&conn, card)?;
        Ok(card.id.clone())
    }

    /// Insert decks along with their cards in a single transaction. If any
    /// insert fails, nothing is written.
    pub fn create_decks_with_cards(&self, decks: &[(Deck, Vec<Flashcard>)]) -> Fallible<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        for (deck, cards) in decks {
            insert_deck(&tx, deck)?;
            for card in cards {
                insert_flashcard(&tx, card)?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_flashcard(&self, id: &CardId) -> Fallible<Option<Flashcard>> {
        let conn = self.acquire()?;
        let sql = format!("select {FLASHCARD_COLUMNS} from flashcards where id = ?;");
        let card = conn.query_row(&sql, [id], flashcard_from_row).optional()?;
        Ok(card)
    }

    /// The cards in a deck, newest first.
    pub fn get_flashcards_by_deck(&self, deck_id: &DeckId) -> Fallible<Vec<Flashcard>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {FLASHCARD_COLUMNS} from flashcards where deckId = ? order by createdAt desc, id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map([deck_id], flashcard_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Every card in the collection, oldest first.
    pub fn get_all_flashcards(&self) -> Fallible<Vec<Flashcard>> {
        let conn = self.acquire()?;
        let sql = format!("select {FLASHCARD_COLUMNS} from flashcards order by createdAt, id;");
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map([], flashcard_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// The cards due at `now`, most overdue first.
    pub fn get_all_flashcards_due(&self, now: Timestamp) -> Fallible<Vec<Flashcard>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {FLASHCARD_COLUMNS} from flashcards where nextReviewAt is not null and nextReviewAt <= ? order by nextReviewAt, id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map([now], flashcard_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Persist the scheduling fields of a card returned by
    /// [`crate::srs::rate`].
    ///
    /// The write only goes through if the stored repetition count is the one
    /// the rating was computed from. Otherwise another rating of the same
    /// card landed first, and this one is rejected rather than silently
    /// overwriting it. A rejected update means the rating was not applied.
    pub fn update_flashcard_schedule(&self, card: &Flashcard) -> Fallible<()> {
        check_schedule(card)?;
        let Some(previous_count) = card.repetition_count.checked_sub(1) else {
            return fail(format!("card {} has not been rated", card.id));
        };
        let conn = self.acquire()?;
        let sql = "update flashcards set intervalDays = ?, easeFactor = ?, repetitionCount = ?, nextReviewAt = ?, updatedAt = ? where id = ? and repetitionCount = ?;";
        let updated = conn.execute(
            sql,
            (
                card.interval_days,
                card.ease_factor,
                card.repetition_count,
                card.next_review_at,
                card.updated_at,
                &card.id,
                previous_count,
            ),
        )?;
        if updated == 0 {
            if card_exists(&conn, &card.id)? {
                return fail(format!(
                    "write conflict on card {}: it was rated concurrently",
                    card.id
                ));
            }
            return fail(format!("no card with ID {}", card.id));
        }
        Ok(())
    }

    /// Change a card's text. Scheduling fields are not touched.
    pub fn update_flashcard_content(
        &self,
        id: &CardId,
        front: &str,
        back: &str,
        now: Timestamp,
    ) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "update flashcards set front = ?, back = ?, updatedAt = ? where id = ?;";
        let updated = conn.execute(sql, (front.trim(), back.trim(), now, id))?;
        if updated == 0 {
            return fail(format!("no card with ID {id}"));
        }
        Ok(())
    }

    pub fn delete_flashcard(&self, id: &CardId) -> Fallible<()> {
        let conn = self.acquire()?;
        let deleted = conn.execute("delete from flashcards where id = ?;", [id])?;
        if deleted == 0 {
            return fail(format!("no card with ID {id}"));
        }
        Ok(())
    }

    // Ideas.

    pub fn create_idea(&self, idea: &Idea) -> Fallible<IdeaId> {
        log::debug!("Adding idea {}: {}", idea.id, idea.title);
        let vision_points = serde_json::to_string(&idea.vision_points)?;
        let tags = serde_json::to_string(&idea.tags)?;
        let conn = self.acquire()?;
        let sql = format!("insert into ideas ({IDEA_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?);");
        conn.execute(
            &sql,
            (
                &idea.id,
                &idea.title,
                idea.emotional_state,
                vision_points,
                idea.priority,
                tags,
                idea.created_at,
                idea.updated_at,
                idea.last_accessed_at,
            ),
        )?;
        Ok(idea.id.clone())
    }

    /// All ideas, newest first.
    pub fn get_all_ideas(&self) -> Fallible<Vec<Idea>> {
        let conn = self.acquire()?;
        let sql = format!("select {IDEA_COLUMNS} from ideas order by createdAt desc, id;");
        let mut stmt = conn.prepare(&sql)?;
        let ideas = stmt
            .query_map([], idea_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ideas)
    }

    // Sessions.

    pub fn save_session(&self, session: &StudySession) -> Fallible<()> {
        let cards_studied = i64::try_from(session.cards_studied)
            .map_err(|_| ErrorReport::new("session card count out of range"))?;
        let conn = self.acquire()?;
        let sql = format!("insert into study_sessions ({SESSION_COLUMNS}) values (?, ?, ?, ?, ?, ?);");
        conn.execute(
            &sql,
            (
                &session.id,
                session.started_at,
                session.ended_at,
                cards_studied,
                session.mode,
                session.energy_level,
            ),
        )?;
        Ok(())
    }

    /// All sessions, oldest first.
    pub fn get_all_sessions(&self) -> Fallible<Vec<StudySession>> {
        let conn = self.acquire()?;
        let sql = format!("select {SESSION_COLUMNS} from study_sessions order by startedAt, id;");
        let mut stmt = conn.prepare(&sql)?;
        let sessions = stmt
            .query_map([], session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ErrorReport::new("database connection lock poisoned"))
    }
}

fn deck_from_row(row: &Row) -> rusqlite::Result<Deck> {
    Ok(Deck {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn flashcard_from_row(row: &Row) -> rusqlite::Result<Flashcard> {
    Ok(Flashcard {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        interval_days: row.get(4)?,
        ease_factor: row.get(5)?,
        repetition_count: row.get(6)?,
        next_review_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn idea_from_row(row: &Row) -> rusqlite::Result<Idea> {
    Ok(Idea {
        id: row.get(0)?,
        title: row.get(1)?,
        emotional_state: row.get(2)?,
        vision_points: json_column(row, 3)?,
        priority: row.get(4)?,
        tags: json_column(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        last_accessed_at: row.get(8)?,
    })
}

fn session_from_row(row: &Row) -> rusqlite::Result<StudySession> {
    let cards_studied: i64 = row.get(3)?;
    let cards_studied = usize::try_from(cards_studied)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(e)))?;
    Ok(StudySession {
        id: row.get(0)?,
        started_at: row.get(1)?,
        ended_at: row.get(2)?,
        cards_studied,
        mode: row.get(4)?,
        energy_level: row.get(5)?,
    })
}

/// Read a list of strings stored as JSON text.
fn json_column(row: &Row, index: usize) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(index)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn insert_deck(conn: &Connection, deck: &Deck) -> Fallible<()> {
    log::debug!("Adding deck {}: {}", deck.id, deck.name);
    let sql = format!("insert into decks ({DECK_COLUMNS}) values (?, ?, ?, ?, ?, ?);");
    conn.execute(
        &sql,
        (
            &deck.id,
            &deck.name,
            &deck.description,
            &deck.color,
            deck.created_at,
            deck.updated_at,
        ),
    )?;
    Ok(())
}

fn insert_flashcard(conn: &Connection, card: &Flashcard) -> Fallible<()> {
    log::debug!("Adding card {} to deck {}", card.id, card.deck_id);
    check_schedule(card)?;
    if !deck_exists(conn, &card.deck_id)? {
        return fail(format!("no deck with ID {}", card.deck_id));
    }
    let sql = format!(
        "insert into flashcards ({FLASHCARD_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?);"
    );
    conn.execute(
        &sql,
        (
            &card.id,
            &card.deck_id,
            &card.front,
            &card.back,
            card.interval_days,
            card.ease_factor,
            card.repetition_count,
            card.next_review_at,
            card.created_at,
            card.updated_at,
        ),
    )?;
    Ok(())
}

fn deck_exists(conn: &Connection, id: &DeckId) -> Fallible<bool> {
    let count: i64 = conn.query_row("select count(*) from decks where id = ?;", [id], |row| {
        row.get(0)
    })?;
    Ok(count > 0)
}

fn card_exists(conn: &Connection, id: &CardId) -> Fallible<bool> {
    let count: i64 =
        conn.query_row("select count(*) from flashcards where id = ?;", [id], |row| {
            row.get(0)
        })?;
    Ok(count > 0)
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["flashcards"], |row| row.get(0))?;
    Ok(count > 0)
}
