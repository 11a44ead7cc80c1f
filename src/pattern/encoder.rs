use std::fmt;

use crate::error::ProjectionError;
use crate::model::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Up,
    Down,
}

impl Movement {
    /// Up when the close held or rose versus the previous close.
    pub fn between(prev_close: f64, close: f64) -> Self {
        if close >= prev_close {
            Movement::Up
        } else {
            Movement::Down
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Movement::Up => 'U',
            Movement::Down => 'D',
        }
    }
}

/// Up/Down moves of a series, one shorter than the series itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementString {
    moves: Vec<Movement>,
}

impl MovementString {
    pub fn as_slice(&self) -> &[Movement] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Most recent move first.
    pub fn reversed(&self) -> MovementString {
        MovementString {
            moves: self.moves.iter().rev().copied().collect(),
        }
    }
}

impl fmt::Display for MovementString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.moves {
            write!(f, "{}", m.symbol())?;
        }
        Ok(())
    }
}

pub fn encode(series: &PriceSeries) -> Result<MovementString, ProjectionError> {
    if series.len() < 2 {
        return Err(ProjectionError::InsufficientData {
            needed: 2,
            got: series.len(),
        });
    }
    let moves = series
        .points()
        .windows(2)
        .map(|w| Movement::between(w[0].close, w[1].close))
        .collect();
    Ok(MovementString { moves })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use chrono::{TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceSeries::from_closes("TEST", Interval::daily(), start, closes)
    }

    #[test]
    fn ties_count_as_up() {
        let moves = encode(&series(&[10.0, 10.0, 9.0, 9.5])).unwrap();
        assert_eq!(moves.to_string(), "UDU");
    }

    #[test]
    fn reversed_puts_latest_first() {
        let moves = encode(&series(&[1.0, 2.0, 3.0, 2.0])).unwrap();
        assert_eq!(moves.reversed().to_string(), "DUU");
    }

    #[test]
    fn single_point_is_insufficient() {
        assert_eq!(
            encode(&series(&[42.0])),
            Err(ProjectionError::InsufficientData { needed: 2, got: 1 })
        );
        assert!(encode(&series(&[])).is_err());
    }
}
