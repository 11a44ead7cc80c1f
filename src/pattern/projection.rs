use chrono::{DateTime, Duration, Utc};

use crate::error::ProjectionError;
use crate::model::{PriceSeries, ProjectionLine, ProjectionPoint};
use crate::pattern::extractor::extract;
use crate::pattern::locator::{locate, DEFAULT_MAX_PATTERN_LEN, DEFAULT_MIN_PATTERN_LEN};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    pub future_points: usize,
    pub num_lines: usize,
    pub min_pattern_len: usize,
    pub max_pattern_len: usize,
    pub date_step: Duration,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            future_points: 10,
            num_lines: 5,
            min_pattern_len: DEFAULT_MIN_PATTERN_LEN,
            max_pattern_len: DEFAULT_MAX_PATTERN_LEN,
            date_step: Duration::days(1),
        }
    }
}

/// Compound percent moves onto a starting price; the start itself is the first element.
pub fn compound_path(start: f64, percent_changes: &[f64]) -> Vec<f64> {
    let mut path = Vec::with_capacity(percent_changes.len() + 1);
    let mut price = start;
    path.push(price);
    for pct in percent_changes {
        price *= 1.0 + pct / 100.0;
        path.push(price);
    }
    path
}

/// `anchor + steps * step`, or `DateOutOfRange` when that leaves chrono's range.
pub fn step_date(
    anchor: DateTime<Utc>,
    step: Duration,
    steps: usize,
) -> Result<DateTime<Utc>, ProjectionError> {
    i32::try_from(steps)
        .ok()
        .and_then(|n| step.checked_mul(n))
        .and_then(|delta| anchor.checked_add_signed(delta))
        .ok_or(ProjectionError::DateOutOfRange {
            step_secs: step.num_seconds(),
            steps,
        })
}

/// Forward price paths replaying what followed each repeat of the latest
/// movement pattern, anchored at the last point of `series`.
///
/// Candidates too close to the present to supply `future_points` moves are
/// skipped and do not count towards `num_lines`.
pub fn build_projections(
    series: &PriceSeries,
    params: &ProjectionParams,
) -> Result<Vec<ProjectionLine>, ProjectionError> {
    let candidates = locate(series, params.min_pattern_len, params.max_pattern_len)?;
    let anchor = match series.last() {
        Some(p) => *p,
        None => {
            return Err(ProjectionError::InsufficientData { needed: 2, got: 0 });
        }
    };
    let recent_first = series.reversed();

    let mut lines = Vec::new();
    for (&offset, &pattern_length) in &candidates {
        if lines.len() >= params.num_lines {
            break;
        }
        let found = match extract(&recent_first, offset, pattern_length, params.future_points) {
            Ok(m) => m,
            Err(ProjectionError::InsufficientHistory { .. }) => {
                tracing::debug!(
                    symbol = series.symbol(),
                    offset,
                    pattern_length,
                    future_points = params.future_points,
                    "Skipping match without enough following history"
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        let pcts: Vec<f64> = found.trajectory.iter().map(|s| s.percent_change).collect();
        let points = compound_path(anchor.close, &pcts)
            .into_iter()
            .enumerate()
            .map(|(j, close)| -> Result<ProjectionPoint, ProjectionError> {
                let date = step_date(anchor.timestamp, params.date_step, j)?;
                Ok(ProjectionPoint {
                    date: series.format_date(&date),
                    close,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        lines.push(ProjectionLine {
            label: series.format_date(&recent_first[offset].timestamp),
            pattern_length,
            average_change: found.average,
            points,
        });
    }

    tracing::debug!(
        symbol = series.symbol(),
        interval = %series.interval(),
        candidates = candidates.len(),
        lines = lines.len(),
        "Built projections"
    );
    Ok(lines)
}
