use crate::error::ProjectionError;
use crate::model::{PatternMatch, PercentStep, PricePoint};

pub const DEFAULT_FORWARD_LENGTH: usize = 13;

fn percent_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

/// Extract the moves that followed a historical match.
///
/// `recent_first` is the series with its latest point at index 0, so the
/// bars that came after the match chronologically sit at lower indices.
///
/// The matched window compares each bar against the one further in the past
/// (`k + 1`), while the trajectory compares each later bar against the one
/// before it (`k - 1` versus `k`).
pub fn extract(
    recent_first: &[PricePoint],
    offset: usize,
    pattern_length: usize,
    forward_length: usize,
) -> Result<PatternMatch, ProjectionError> {
    let len = recent_first.len();
    let past_end = offset
        .checked_add(pattern_length)
        .map_or(true, |end| end >= len);
    if offset < forward_length || past_end {
        return Err(ProjectionError::InsufficientHistory {
            offset,
            pattern_length,
            forward_length,
            len,
        });
    }

    let window = (offset..offset + pattern_length)
        .map(|k| {
            let p = recent_first[k];
            PercentStep {
                timestamp: p.timestamp,
                close: p.close,
                percent_change: percent_change(recent_first[k + 1].close, p.close),
            }
        })
        .collect();

    let trajectory: Vec<PercentStep> = (offset + 1 - forward_length..=offset)
        .rev()
        .map(|k| {
            let next = recent_first[k - 1];
            PercentStep {
                timestamp: next.timestamp,
                close: next.close,
                percent_change: percent_change(recent_first[k].close, next.close),
            }
        })
        .collect();

    let average = if trajectory.is_empty() {
        0.0
    } else {
        trajectory.iter().map(|s| s.percent_change).sum::<f64>() / trajectory.len() as f64
    };

    Ok(PatternMatch {
        offset,
        pattern_length,
        trajectory,
        window,
        average,
    })
}
