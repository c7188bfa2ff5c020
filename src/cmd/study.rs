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

use std::io::BufRead;
use std::io::Write;

use crate::clock::Clock;
use crate::collection::Collection;
use crate::config::FlowLimits;
use crate::error::Fallible;
use crate::flow::StudyPlan;
use crate::flow::next_step;
use crate::flow::should_take_break;
use crate::srs::count_due;
use crate::srs::rate;
use crate::srs::select_due;
use crate::srs::select_new;
use crate::types::energy::EnergyLevel;
use crate::types::energy::StudyMode;
use crate::types::flashcard::Flashcard;
use crate::types::id::SessionId;
use crate::types::rating::Rating;
use crate::types::session::StudySession;

/// Work out what to study without starting a session.
pub fn plan_session(
    coll: &Collection,
    clock: &dyn Clock,
    energy: EnergyLevel,
) -> Fallible<StudyPlan> {
    let cards = coll.db.get_all_flashcards()?;
    let now = clock.now();
    Ok(next_step(
        energy,
        count_due(&cards, now),
        select_new(&cards).len(),
        &coll.config.flow,
    ))
}

/// Pick the cards for a session: due cards, most overdue first, then new
/// cards, oldest first.
pub fn build_queue(
    cards: &[Flashcard],
    plan: &StudyPlan,
    limits: &FlowLimits,
    clock: &dyn Clock,
) -> Vec<Flashcard> {
    let mut due = select_due(cards, clock.now());
    due.sort_by_key(|card| card.next_review_at);
    let mut new = select_new(cards);
    new.sort_by_key(|card| card.created_at);
    let queue: Vec<Flashcard> = match plan.mode {
        StudyMode::Reviews => due,
        StudyMode::Light => {
            if due.is_empty() {
                new
            } else {
                due
            }
        }
        StudyMode::Mixed => due
            .into_iter()
            .take(limits.review_limit)
            .chain(new.into_iter().take(limits.new_card_limit))
            .collect(),
    };
    queue.into_iter().take(plan.count).collect()
}

enum Answer {
    Rate(Rating),
    Quit,
}

/// Run an interactive session, reading from `input` and writing to `output`.
///
/// Each rating is persisted before the next card is shown. A card whose
/// rating cannot be applied is reported and skipped. The session is saved
/// if at least one card was rated, even when the loop stops on an error.
pub fn run_session<R: BufRead, W: Write>(
    coll: &Collection,
    clock: &dyn Clock,
    energy: EnergyLevel,
    input: &mut R,
    output: &mut W,
) -> Fallible<StudySession> {
    let started_at = clock.now();
    let cards = coll.db.get_all_flashcards()?;
    let plan = next_step(
        energy,
        count_due(&cards, started_at),
        select_new(&cards).len(),
        &coll.config.flow,
    );
    writeln!(output, "{}", plan.message)?;
    let queue = build_queue(&cards, &plan, &coll.config.flow, clock);
    log::debug!("Session queue: {} cards ({} mode)", queue.len(), plan.mode);

    let mut cards_studied = 0;
    let outcome = study_queue(coll, clock, queue, input, output, &mut cards_studied);

    let session = StudySession {
        id: SessionId::generate(&[energy.as_str()], started_at),
        started_at,
        ended_at: Some(clock.now()),
        cards_studied,
        mode: plan.mode,
        energy_level: energy,
    };
    if cards_studied > 0 {
        coll.db.save_session(&session)?;
    }
    outcome?;
    writeln!(output)?;
    writeln!(output, "Session completed: {cards_studied} cards studied.")?;
    if should_take_break(session.minutes().max(0) as u64) {
        writeln!(output, "Time for a short break.")?;
    }
    Ok(session)
}

/// Show each card in turn and apply the user's ratings. `cards_studied` is
/// kept current so the caller can record the session if this fails.
fn study_queue<R: BufRead, W: Write>(
    coll: &Collection,
    clock: &dyn Clock,
    queue: Vec<Flashcard>,
    input: &mut R,
    output: &mut W,
    cards_studied: &mut usize,
) -> Fallible<()> {
    let total = queue.len();
    for (index, card) in queue.into_iter().enumerate() {
        writeln!(output)?;
        writeln!(output, "[{}/{}] Q: {}", index + 1, total, card.front)?;
        writeln!(output, "[press enter to reveal, q to quit]")?;
        match read_line(input)? {
            Some(line) if line != "q" => {}
            _ => break,
        }
        writeln!(output, "A: {}", card.back)?;
        let rating = match read_rating(input, output)? {
            Answer::Rate(rating) => rating,
            Answer::Quit => break,
        };
        match apply_rating(coll, clock, &card, rating, output) {
            Ok(true) => *cards_studied += 1,
            Ok(false) => {}
            Err(err) => {
                log::warn!("Could not rate {}: {err}", card.id);
                writeln!(output, "{err}; rating not applied.")?;
            }
        }
    }
    Ok(())
}

/// Rate a card and persist the result. If the write is rejected, reload the
/// card and try once more from the fresh state. Returns whether the rating
/// was applied.
fn apply_rating<W: Write>(
    coll: &Collection,
    clock: &dyn Clock,
    card: &Flashcard,
    rating: Rating,
    output: &mut W,
) -> Fallible<bool> {
    let rated = rate(card, rating, clock.now())?;
    let err = match coll.db.update_flashcard_schedule(&rated) {
        Ok(()) => return Ok(true),
        Err(err) => err,
    };
    log::warn!("Retrying rating of {}: {err}", card.id);
    let Some(fresh) = coll.db.get_flashcard(&card.id)? else {
        writeln!(output, "Card {} no longer exists; rating not applied.", card.id)?;
        return Ok(false);
    };
    let retried = rate(&fresh, rating, clock.now())
        .and_then(|rated| coll.db.update_flashcard_schedule(&rated));
    match retried {
        Ok(()) => Ok(true),
        Err(err) => {
            log::warn!("Retry of {} failed: {err}", card.id);
            writeln!(output, "{err}; rating not applied.")?;
            Ok(false)
        }
    }
}

fn read_rating<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Fallible<Answer> {
    loop {
        writeln!(output, "Rating: (e = easy, m = medium, h = hard, q = quit)")?;
        let Some(line) = read_line(input)? else {
            return Ok(Answer::Quit);
        };
        if line == "q" {
            return Ok(Answer::Quit);
        }
        match Rating::from_key(&line) {
            Some(rating) => return Ok(Answer::Rate(rating)),
            None => writeln!(output, "Invalid input.")?,
        }
    }
}

/// Read a trimmed, lowercased line. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}
