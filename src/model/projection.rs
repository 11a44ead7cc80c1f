use chrono::{DateTime, Utc};
use serde::Serialize;

/// One bar annotated with its percent move (2.0 means +2 %).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentStep {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub percent_change: f64,
}

/// A historical repetition of the most recent movement pattern and what followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    /// Index into the most-recent-first view of the series.
    pub offset: usize,
    pub pattern_length: usize,
    /// Moves that followed the match, oldest first.
    pub trajectory: Vec<PercentStep>,
    /// The matched bars, walking back in time from `offset`.
    pub window: Vec<PercentStep>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub date: String,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionLine {
    /// Date the replayed pattern was found at.
    pub label: String,
    pub pattern_length: usize,
    pub average_change: f64,
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionLine {
    pub fn anchor(&self) -> Option<&ProjectionPoint> {
        self.points.first()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}
