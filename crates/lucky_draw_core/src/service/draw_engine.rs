//! Without-replacement random draw.
//!
//! # Responsibility
//! - Derive the available set from a range and the history ledger.
//! - Pick one element uniformly at random.
//! - Track the Idle/Drawing reveal state so a caller cannot double-submit.
//!
//! # Invariants
//! - `compute_available` output is strictly increasing and excludes every
//!   number present anywhere in history, regardless of the range it was
//!   drawn under.
//! - The engine never persists; committing a result to history is the
//!   caller's job and happens only after the reveal completes.

use crate::model::range::{DrawRange, InvalidRangeError};
use crate::model::spin::SpinHistory;
use log::debug;
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest range the engine will materialize as an available set.
pub const MAX_RANGE_SPAN: u128 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    InvalidRange(InvalidRangeError),
    /// Range is too wide to enumerate.
    RangeTooLarge { span: u128, limit: u128 },
    /// No numbers left to draw.
    Exhausted,
    /// A draw is already being revealed.
    Busy,
    /// Reveal completion signalled without a pending draw.
    NoPendingDraw,
}

impl Display for DrawError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange(err) => write!(f, "{err}"),
            Self::RangeTooLarge { span, limit } => {
                write!(f, "range holds {span} numbers; at most {limit} are supported")
            }
            Self::Exhausted => write!(
                f,
                "no numbers left to draw; clear the history or widen the range"
            ),
            Self::Busy => write!(f, "a draw is already in progress"),
            Self::NoPendingDraw => write!(f, "no draw is in progress"),
        }
    }
}

impl Error for DrawError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRange(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidRangeError> for DrawError {
    fn from(value: InvalidRangeError) -> Self {
        Self::InvalidRange(value)
    }
}

/// Every integer in `[min, max]` not already drawn in `history`.
///
/// # Errors
/// - `InvalidRange` when `max < min`.
/// - `RangeTooLarge` when the interval exceeds `MAX_RANGE_SPAN`.
pub fn compute_available(
    min: i64,
    max: i64,
    history: Option<&SpinHistory>,
) -> Result<Vec<i64>, DrawError> {
    let range = DrawRange::new(min, max)?;
    available_in(range, history)
}

/// Same as `compute_available` for an already validated range.
pub fn available_in(range: DrawRange, history: Option<&SpinHistory>) -> Result<Vec<i64>, DrawError> {
    let span = range.span();
    if span > MAX_RANGE_SPAN {
        return Err(DrawError::RangeTooLarge {
            span,
            limit: MAX_RANGE_SPAN,
        });
    }

    let drawn: HashSet<i64> = history
        .map(|history| history.numbers().collect())
        .unwrap_or_default();

    Ok((range.min()..=range.max())
        .filter(|number| !drawn.contains(number))
        .collect())
}

/// Uniformly picks one element of `available`.
///
/// # Errors
/// - `Exhausted` when `available` is empty.
pub fn draw<R: Rng>(available: &[i64], rng: &mut R) -> Result<i64, DrawError> {
    if available.is_empty() {
        return Err(DrawError::Exhausted);
    }
    let index = rng.random_range(0..available.len());
    Ok(available[index])
}

/// A drawn number waiting for its reveal to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDraw {
    pub number: i64,
    /// Range in effect when the draw was requested.
    pub range: DrawRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawPhase {
    #[default]
    Idle,
    Drawing(PendingDraw),
}

/// Reveal state machine wrapped around `draw`.
#[derive(Debug, Default)]
pub struct DrawEngine {
    phase: DrawPhase,
}

impl DrawEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, DrawPhase::Drawing(_))
    }

    /// Idle -> Drawing. The result is computed immediately; any reveal delay
    /// belongs to the caller.
    ///
    /// Failed requests leave the engine in its previous state.
    pub fn request_draw<R: Rng>(
        &mut self,
        range: DrawRange,
        available: &[i64],
        rng: &mut R,
    ) -> Result<PendingDraw, DrawError> {
        if self.is_drawing() {
            return Err(DrawError::Busy);
        }
        let number = draw(available, rng)?;
        let pending = PendingDraw { number, range };
        self.phase = DrawPhase::Drawing(pending);
        debug!(
            "event=draw_request module=engine status=ok number={number} available={}",
            available.len()
        );
        Ok(pending)
    }

    /// Drawing -> Idle, handing back the result to commit.
    pub fn complete_reveal(&mut self) -> Result<PendingDraw, DrawError> {
        match std::mem::take(&mut self.phase) {
            DrawPhase::Drawing(pending) => Ok(pending),
            DrawPhase::Idle => Err(DrawError::NoPendingDraw),
        }
    }

    /// Drawing -> Idle, discarding the result. Returns the discarded draw.
    pub fn cancel(&mut self) -> Option<PendingDraw> {
        match std::mem::take(&mut self.phase) {
            DrawPhase::Drawing(pending) => {
                debug!(
                    "event=draw_cancel module=engine status=ok number={}",
                    pending.number
                );
                Some(pending)
            }
            DrawPhase::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_available, draw, DrawEngine, DrawError, DrawPhase, MAX_RANGE_SPAN};
    use crate::model::range::{DrawRange, InvalidRangeError};
    use crate::model::spin::{SpinHistory, SpinRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn history_with(numbers: &[i64], min: i64, max: i64) -> SpinHistory {
        let mut history = SpinHistory::new(min, max, "2024-01-01T00:00:00.000Z");
        for number in numbers {
            history
                .records
                .push(SpinRecord::new(*number, min, max, "2024-01-01T00:00:00.000Z"));
        }
        history
    }

    #[test]
    fn available_excludes_history_and_stays_sorted() {
        let history = history_with(&[3, 1], 1, 5);
        assert_eq!(compute_available(1, 5, Some(&history)).unwrap(), vec![2, 4, 5]);
        assert_eq!(compute_available(1, 5, None).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn available_excludes_numbers_drawn_under_other_ranges() {
        // Raw number membership, not range-scoped.
        let history = history_with(&[7], 1, 100);
        assert_eq!(compute_available(5, 8, Some(&history)).unwrap(), vec![5, 6, 8]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            compute_available(10, 9, None).unwrap_err(),
            DrawError::InvalidRange(InvalidRangeError { min: 10, max: 9 })
        );
    }

    #[test]
    fn oversized_range_is_rejected() {
        let err = compute_available(0, i64::MAX, None).unwrap_err();
        assert!(matches!(err, DrawError::RangeTooLarge { limit, .. } if limit == MAX_RANGE_SPAN));
    }

    #[test]
    fn draw_on_empty_set_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(draw(&[], &mut rng).unwrap_err(), DrawError::Exhausted);
    }

    #[test]
    fn draw_only_returns_members_and_reaches_all_of_them() {
        let mut rng = StdRng::seed_from_u64(42);
        let available = [2, 4, 8];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            let number = draw(&available, &mut rng).unwrap();
            assert!(available.contains(&number));
            seen.insert(number);
        }
        assert_eq!(seen.len(), available.len());
    }

    #[test]
    fn engine_rejects_double_submit_and_completes_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = DrawRange::new(1, 3).unwrap();
        let mut engine = DrawEngine::new();

        let pending = engine.request_draw(range, &[1, 2, 3], &mut rng).unwrap();
        assert_eq!(engine.phase(), DrawPhase::Drawing(pending));
        assert_eq!(
            engine.request_draw(range, &[1, 2, 3], &mut rng).unwrap_err(),
            DrawError::Busy
        );

        assert_eq!(engine.complete_reveal().unwrap(), pending);
        assert_eq!(engine.phase(), DrawPhase::Idle);
        assert_eq!(engine.complete_reveal().unwrap_err(), DrawError::NoPendingDraw);
    }

    #[test]
    fn failed_request_leaves_engine_idle() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = DrawRange::new(1, 1).unwrap();
        let mut engine = DrawEngine::new();
        assert_eq!(
            engine.request_draw(range, &[], &mut rng).unwrap_err(),
            DrawError::Exhausted
        );
        assert!(!engine.is_drawing());
        assert_eq!(engine.cancel(), None);
    }
}
