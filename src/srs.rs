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

//! The spaced repetition scheduler.
//!
//! A variant of SM-2 with three ratings. Every function here is pure: the
//! current time is passed in, and cards are never mutated in place.
//!
//! Intervals are rounded with [`f64::round`], which rounds half away from
//! zero. Intervals are never negative, so this is the same as rounding half
//! up.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::flashcard::Flashcard;
use crate::types::id::CardId;
use crate::types::id::DeckId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// The interval set by a card's first review, regardless of rating.
pub const INITIAL_INTERVAL_DAYS: f64 = 1.0;

/// The ease factor of a new card.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

pub const MIN_EASE_FACTOR: f64 = 1.3;

pub const MAX_EASE_FACTOR: f64 = 3.0;

/// How much an `Easy` rating raises, or a `Hard` rating lowers, the ease
/// factor.
const EASE_STEP: f64 = 0.15;

/// A card rated `Hard` whose previous interval exceeds this many days has its
/// interval halved instead of grown.
const REGRESSION_THRESHOLD_DAYS: f64 = 7.0;

const REGRESSION_FACTOR: f64 = 0.5;

/// Whether a freshly created card waits in the "new" bucket or is due
/// straight away.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewCardPolicy {
    /// `next_review_at` is left empty: the card is new until first rated.
    #[default]
    Unscheduled,
    /// `next_review_at` is set to the creation instant: the card is due.
    Immediate,
}

/// Create a card with the initial scheduling state.
pub fn new_card(
    deck_id: DeckId,
    front: impl Into<String>,
    back: impl Into<String>,
    now: Timestamp,
    policy: NewCardPolicy,
) -> Flashcard {
    let front = front.into().trim().to_string();
    let back = back.into().trim().to_string();
    let next_review_at = match policy {
        NewCardPolicy::Unscheduled => None,
        NewCardPolicy::Immediate => Some(now),
    };
    Flashcard {
        id: CardId::generate(&[deck_id.as_ref(), &front, &back], now),
        deck_id,
        front,
        back,
        interval_days: 0.0,
        ease_factor: INITIAL_EASE_FACTOR,
        repetition_count: 0,
        next_review_at,
        created_at: now,
        updated_at: now,
    }
}

/// Compute a card's next scheduling state after the user rates it.
///
/// Returns a new card; the input is left untouched. Only the scheduling
/// fields and `updated_at` change.
///
/// Fails only if the input card is already corrupt (see
/// [`check_schedule`]), or if the due date would overflow the calendar.
pub fn rate(card: &Flashcard, rating: Rating, now: Timestamp) -> Fallible<Flashcard> {
    check_schedule(card)?;
    let repetition_count = card
        .repetition_count
        .checked_add(1)
        .ok_or_else(|| ErrorReport::new(format!("card {}: repetition count overflow", card.id)))?;
    let (interval_days, ease_factor) = if card.repetition_count == 0 {
        (INITIAL_INTERVAL_DAYS, card.ease_factor)
    } else {
        reschedule(card.interval_days, card.ease_factor, rating)
    };
    let next_review_at = now.add_days(interval_days)?;
    log::debug!(
        "{} {} I={}d E={:.2} due={}",
        card.id,
        rating,
        interval_days,
        ease_factor,
        next_review_at
    );
    Ok(Flashcard {
        interval_days,
        ease_factor,
        repetition_count,
        next_review_at: Some(next_review_at),
        updated_at: now,
        ..card.clone()
    })
}

/// The interval and ease of a card that has been reviewed before.
fn reschedule(interval: f64, ease: f64, rating: Rating) -> (f64, f64) {
    let grown = (interval * rating.multiplier()).round();
    match rating {
        Rating::Easy => (grown, (ease + EASE_STEP).min(MAX_EASE_FACTOR)),
        Rating::Medium => (grown, ease),
        Rating::Hard => {
            let ease = (ease - EASE_STEP).max(MIN_EASE_FACTOR);
            if interval > REGRESSION_THRESHOLD_DAYS {
                ((interval * REGRESSION_FACTOR).round().max(1.0), ease)
            } else {
                (grown, ease)
            }
        }
    }
}

/// Reject cards whose scheduling fields are outside their valid ranges, so
/// corruption from elsewhere is not silently propagated.
pub fn check_schedule(card: &Flashcard) -> Fallible<()> {
    let ease = card.ease_factor;
    if !(MIN_EASE_FACTOR..=MAX_EASE_FACTOR).contains(&ease) {
        return fail(format!(
            "card {}: ease factor {ease} outside [{MIN_EASE_FACTOR}, {MAX_EASE_FACTOR}]",
            card.id
        ));
    }
    let interval = card.interval_days;
    if !interval.is_finite() || interval < 0.0 {
        return fail(format!("card {}: invalid interval {interval}", card.id));
    }
    if card.repetition_count > 0 && interval < INITIAL_INTERVAL_DAYS {
        return fail(format!(
            "card {}: reviewed {} times but interval is {interval}",
            card.id, card.repetition_count
        ));
    }
    Ok(())
}

/// True if the card is scheduled and its review time has arrived.
pub fn is_due(card: &Flashcard, now: Timestamp) -> bool {
    match card.next_review_at {
        Some(next_review_at) => next_review_at <= now,
        None => false,
    }
}

/// The cards that are due at `now`, in input order.
pub fn select_due(cards: &[Flashcard], now: Timestamp) -> Vec<Flashcard> {
    cards
        .iter()
        .filter(|card| is_due(card, now))
        .cloned()
        .collect()
}

/// The cards that have never been scheduled, in input order.
pub fn select_new(cards: &[Flashcard]) -> Vec<Flashcard> {
    cards.iter().filter(|card| card.is_new()).cloned().collect()
}

pub fn count_due(cards: &[Flashcard], now: Timestamp) -> usize {
    cards.iter().filter(|card| is_due(card, now)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp::MS_PER_DAY;

    const T: i64 = 1_750_000_000_000;

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms).unwrap()
    }

    fn card(interval_days: f64, ease_factor: f64, repetition_count: u32) -> Flashcard {
        let mut card = new_card(
            DeckId::from("deck_test"),
            "What is the capital of France?",
            "Paris",
            at(T - 10 * MS_PER_DAY),
            NewCardPolicy::Unscheduled,
        );
        card.interval_days = interval_days;
        card.ease_factor = ease_factor;
        card.repetition_count = repetition_count;
        card
    }

    fn scheduled(next_review_at: Option<i64>) -> Flashcard {
        let mut c = card(1.0, 2.5, 1);
        c.next_review_at = next_review_at.map(at);
        c
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    const RATINGS: [Rating; 3] = [Rating::Easy, Rating::Medium, Rating::Hard];

    #[test]
    fn test_new_card_defaults() {
        let c = new_card(
            DeckId::from("deck_a"),
            "  front ",
            " back",
            at(T),
            NewCardPolicy::Unscheduled,
        );
        assert_eq!(c.front, "front");
        assert_eq!(c.back, "back");
        assert_eq!(c.interval_days, 0.0);
        assert_eq!(c.ease_factor, INITIAL_EASE_FACTOR);
        assert_eq!(c.repetition_count, 0);
        assert_eq!(c.next_review_at, None);
        assert_eq!(c.created_at, at(T));
        assert_eq!(c.updated_at, at(T));
        assert!(c.id.to_string().starts_with("card_"));
    }

    #[test]
    fn test_new_card_immediate_policy() {
        let c = new_card(
            DeckId::from("deck_a"),
            "q",
            "a",
            at(T),
            NewCardPolicy::Immediate,
        );
        assert_eq!(c.next_review_at, Some(at(T)));
        assert_eq!(c.repetition_count, 0);
        assert!(is_due(&c, at(T)));
    }

    #[test]
    fn test_first_review_ignores_rating() -> Fallible<()> {
        for rating in RATINGS {
            for ease in [1.3, 2.0, 2.5, 3.0] {
                let c = card(0.0, ease, 0);
                let rated = rate(&c, rating, at(T))?;
                assert_eq!(rated.interval_days, 1.0);
                assert_eq!(rated.ease_factor, ease);
                assert_eq!(rated.repetition_count, 1);
            }
        }
        Ok(())
    }

    #[test]
    fn test_scenario_first_easy() -> Fallible<()> {
        let rated = rate(&card(0.0, 2.5, 0), Rating::Easy, at(T))?;
        assert_eq!(rated.interval_days, 1.0);
        assert_eq!(rated.ease_factor, 2.5);
        assert_eq!(rated.repetition_count, 1);
        assert_eq!(rated.next_review_at, Some(at(T + 86_400_000)));
        Ok(())
    }

    #[test]
    fn test_scenario_second_easy() -> Fallible<()> {
        let rated = rate(&card(1.0, 2.5, 1), Rating::Easy, at(T))?;
        assert_eq!(rated.interval_days, 3.0);
        assert_close(rated.ease_factor, 2.65);
        assert_eq!(rated.repetition_count, 2);
        assert_eq!(rated.next_review_at, Some(at(T + 3 * 86_400_000)));
        Ok(())
    }

    #[test]
    fn test_scenario_hard_regression() -> Fallible<()> {
        let rated = rate(&card(10.0, 2.0, 5), Rating::Hard, at(T))?;
        assert_eq!(rated.interval_days, 5.0);
        assert_close(rated.ease_factor, 1.85);
        assert_eq!(rated.repetition_count, 6);
        Ok(())
    }

    #[test]
    fn test_scenario_hard_without_regression() -> Fallible<()> {
        let rated = rate(&card(5.0, 2.0, 3), Rating::Hard, at(T))?;
        assert_eq!(rated.interval_days, 6.0);
        assert_close(rated.ease_factor, 1.85);
        assert_eq!(rated.repetition_count, 4);
        Ok(())
    }

    #[test]
    fn test_medium_keeps_ease() -> Fallible<()> {
        let rated = rate(&card(1.0, 2.2, 1), Rating::Medium, at(T))?;
        assert_eq!(rated.interval_days, 2.0);
        assert_eq!(rated.ease_factor, 2.2);
        let rated = rate(&card(4.0, 2.2, 2), Rating::Medium, at(T))?;
        assert_eq!(rated.interval_days, 6.0);
        Ok(())
    }

    #[test]
    fn test_easy_growth() -> Fallible<()> {
        for interval in [1.0, 2.0, 3.0, 7.0, 8.0, 40.0] {
            let rated = rate(&card(interval, 2.5, 2), Rating::Easy, at(T))?;
            assert_eq!(rated.interval_days, (interval * 2.5).round());
            assert_close(rated.ease_factor, 2.65);
        }
        Ok(())
    }

    #[test]
    fn test_hard_threshold_is_exclusive() -> Fallible<()> {
        // Seven days is not mature: the multiplier applies.
        let rated = rate(&card(7.0, 2.5, 4), Rating::Hard, at(T))?;
        assert_eq!(rated.interval_days, 8.0);
        // Eight days is: the interval is halved.
        let rated = rate(&card(8.0, 2.5, 4), Rating::Hard, at(T))?;
        assert_eq!(rated.interval_days, 4.0);
        Ok(())
    }

    #[test]
    fn test_hard_short_intervals() -> Fallible<()> {
        for interval in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0] {
            let rated = rate(&card(interval, 2.5, 2), Rating::Hard, at(T))?;
            assert_eq!(rated.interval_days, (interval * 1.1).round());
            assert!(rated.interval_days >= 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_regression_uses_previous_interval() -> Fallible<()> {
        // 9 * 1.1 would round to 10; the regression replaces that with
        // round(9 * 0.5) = 5 rather than compounding the two.
        let rated = rate(&card(9.0, 2.5, 4), Rating::Hard, at(T))?;
        assert_eq!(rated.interval_days, 5.0);
        let rated = rate(&card(7.5, 2.5, 4), Rating::Hard, at(T))?;
        assert_eq!(rated.interval_days, 4.0);
        Ok(())
    }

    #[test]
    fn test_ease_clamped_under_repetition() -> Fallible<()> {
        let mut c = card(0.0, 2.5, 0);
        for _ in 0..20 {
            c = rate(&c, Rating::Easy, at(T))?;
            assert!(c.ease_factor <= MAX_EASE_FACTOR);
            // Keep the interval small so the due date stays in range.
            c.interval_days = 1.0;
        }
        assert_eq!(c.ease_factor, MAX_EASE_FACTOR);

        let mut c = card(0.0, 2.5, 0);
        for _ in 0..20 {
            c = rate(&c, Rating::Hard, at(T))?;
            assert!(c.ease_factor >= MIN_EASE_FACTOR);
        }
        assert_eq!(c.ease_factor, MIN_EASE_FACTOR);
        Ok(())
    }

    #[test]
    fn test_invariants_hold_over_sequences() -> Fallible<()> {
        let sequences: [&[Rating]; 4] = [
            &[Rating::Easy, Rating::Easy, Rating::Hard, Rating::Medium],
            &[Rating::Hard, Rating::Hard, Rating::Hard],
            &[Rating::Medium, Rating::Easy, Rating::Easy, Rating::Hard, Rating::Hard],
            &[Rating::Easy, Rating::Medium, Rating::Medium, Rating::Easy, Rating::Hard],
        ];
        for sequence in sequences {
            let mut c = card(0.0, INITIAL_EASE_FACTOR, 0);
            let mut now = T;
            for (i, rating) in sequence.iter().enumerate() {
                let rated = rate(&c, *rating, at(now))?;
                assert_eq!(rated.repetition_count, i as u32 + 1);
                assert!(rated.interval_days >= 1.0);
                assert!((MIN_EASE_FACTOR..=MAX_EASE_FACTOR).contains(&rated.ease_factor));
                let expected = now + rated.interval_days as i64 * MS_PER_DAY;
                assert_eq!(rated.next_review_at, Some(at(expected)));
                assert_eq!(rated.updated_at, at(now));
                now = expected;
                c = rated;
            }
        }
        Ok(())
    }

    #[test]
    fn test_rate_leaves_content_alone() -> Fallible<()> {
        let c = card(3.0, 2.5, 2);
        let rated = rate(&c, Rating::Medium, at(T))?;
        assert_eq!(rated.id, c.id);
        assert_eq!(rated.deck_id, c.deck_id);
        assert_eq!(rated.front, c.front);
        assert_eq!(rated.back, c.back);
        assert_eq!(rated.created_at, c.created_at);
        // The input is unchanged.
        assert_eq!(c.repetition_count, 2);
        assert_eq!(c.interval_days, 3.0);
        Ok(())
    }

    #[test]
    fn test_rate_is_deterministic() -> Fallible<()> {
        let c = card(6.0, 2.1, 3);
        assert_eq!(rate(&c, Rating::Hard, at(T))?, rate(&c, Rating::Hard, at(T))?);
        Ok(())
    }

    #[test]
    fn test_rate_rejects_corrupt_cards() {
        assert!(rate(&card(1.0, 3.2, 1), Rating::Easy, at(T)).is_err());
        assert!(rate(&card(1.0, 1.0, 1), Rating::Hard, at(T)).is_err());
        assert!(rate(&card(1.0, f64::NAN, 1), Rating::Medium, at(T)).is_err());
        assert!(rate(&card(-1.0, 2.5, 1), Rating::Medium, at(T)).is_err());
        assert!(rate(&card(f64::INFINITY, 2.5, 1), Rating::Medium, at(T)).is_err());
        assert!(rate(&card(0.0, 2.5, 3), Rating::Medium, at(T)).is_err());
        assert!(rate(&card(1.0, 2.5, u32::MAX), Rating::Medium, at(T)).is_err());
    }

    #[test]
    fn test_select_due_scenario() {
        let a = scheduled(Some(T - 1));
        let b = scheduled(Some(T + 1));
        let c = scheduled(None);
        let due = select_due(&[a.clone(), b, c], at(T));
        assert_eq!(due, vec![a]);
    }

    #[test]
    fn test_due_boundary_is_inclusive() {
        let c = scheduled(Some(T));
        assert!(is_due(&c, at(T)));
        assert!(!is_due(&c, at(T - 1)));
    }

    #[test]
    fn test_select_new() {
        let a = scheduled(Some(T - 1));
        let b = scheduled(None);
        let c = scheduled(None);
        assert_eq!(select_new(&[a, b.clone(), c.clone()]), vec![b, c]);
    }

    #[test]
    fn test_due_and_new_are_disjoint() {
        let cards: Vec<Flashcard> = [Some(T - 5), None, Some(T), Some(T + 5), None]
            .into_iter()
            .map(scheduled)
            .collect();
        let due = select_due(&cards, at(T));
        let new = select_new(&cards);
        assert_eq!(due.len(), 2);
        assert_eq!(new.len(), 2);
        assert!(due.iter().all(|d| !new.contains(d)));
        assert_eq!(count_due(&cards, at(T)), due.len());
    }

    #[test]
    fn test_select_due_is_a_snapshot() -> Fallible<()> {
        let mut cards = vec![scheduled(Some(T - 1))];
        let due = select_due(&cards, at(T));
        cards[0] = rate(&cards[0], Rating::Easy, at(T))?;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].repetition_count, 1);
        assert_eq!(count_due(&cards, at(T)), 0);
        Ok(())
    }
}
