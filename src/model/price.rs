use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::interval::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Percent change of one bar versus the bar before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentChange {
    pub date: String,
    pub percent_change: f64,
}

/// Close prices for one (symbol, interval) pair, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    interval: Interval,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps.
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        points: Vec<PricePoint>,
    ) -> Result<Self, ProjectionError> {
        if let Some(index) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(ProjectionError::Unordered { index: index + 1 });
        }
        Ok(Self {
            symbol: symbol.into(),
            interval,
            points,
        })
    }

    /// Series with one bar per interval starting at `start`.
    pub fn from_closes(
        symbol: impl Into<String>,
        interval: Interval,
        start: DateTime<Utc>,
        closes: &[f64],
    ) -> Self {
        let step = Duration::milliseconds(interval.length_ms() as i64);
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + step * i as i32, close))
            .collect();
        Self {
            symbol: symbol.into(),
            interval,
            points,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Most recent point first.
    pub fn reversed(&self) -> Vec<PricePoint> {
        self.points.iter().rev().copied().collect()
    }

    pub fn format_date(&self, timestamp: &DateTime<Utc>) -> String {
        self.interval.format_date(timestamp)
    }

    /// Drop the last `offset` points, as if the series had been fetched `offset` bars ago.
    pub fn truncated(&self, offset: usize) -> Result<Self, ProjectionError> {
        if offset.checked_add(2).map_or(true, |needed| needed > self.points.len()) {
            return Err(ProjectionError::InvalidOffset {
                offset,
                len: self.points.len(),
            });
        }
        Ok(Self {
            symbol: self.symbol.clone(),
            interval: self.interval.clone(),
            points: self.points[..self.points.len() - offset].to_vec(),
        })
    }

    /// Percent changes over the last `window` points, rounded to two decimals.
    /// The oldest point of the window only serves as the base of the first change.
    pub fn recent_changes(&self, window: usize) -> Vec<RecentChange> {
        let start = self.points.len().saturating_sub(window);
        self.points[start..]
            .windows(2)
            .map(|w| {
                let pct = (w[1].close - w[0].close) / w[0].close * 100.0;
                RecentChange {
                    date: self.format_date(&w[1].timestamp),
                    percent_change: round2(pct),
                }
            })
            .collect()
    }
}

/// Two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
