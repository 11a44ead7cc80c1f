use serde::Serialize;

use crate::error::ProjectionError;
use crate::model::{PriceSeries, ProjectionLine, ProjectionPoint};
use crate::pattern::{build_projections, ProjectionParams};

pub const DEFAULT_BACKTEST_OFFSETS: [usize; 3] = [0, 5, 10];

/// A projection made `offset` bars ago next to what the market actually did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestOutcome {
    pub offset: usize,
    pub predicted: Option<ProjectionLine>,
    pub actual: Vec<ProjectionPoint>,
}

/// Re-run the projection on `full` minus its last `offset` bars and collect
/// the realized closes from the truncated anchor onward.
///
/// Only the best-ranked line is kept. `actual` holds up to `future_points + 1`
/// bars because it starts at the anchor itself.
pub fn run_backtest(
    full: &PriceSeries,
    offset: usize,
    future_points: usize,
    params: &ProjectionParams,
) -> Result<BacktestOutcome, ProjectionError> {
    let truncated = full.truncated(offset)?;
    let single = ProjectionParams {
        future_points,
        num_lines: 1,
        ..*params
    };
    let predicted = build_projections(&truncated, &single)?.into_iter().next();

    let anchor_ts = truncated
        .last()
        .map(|p| p.timestamp)
        .ok_or(ProjectionError::InsufficientData { needed: 2, got: 0 })?;
    let actual = full
        .points()
        .iter()
        .filter(|p| p.timestamp >= anchor_ts)
        .take(future_points.saturating_add(1))
        .map(|p| ProjectionPoint {
            date: full.format_date(&p.timestamp),
            close: p.close,
        })
        .collect();

    Ok(BacktestOutcome {
        offset,
        predicted,
        actual,
    })
}

pub fn run_backtests(
    full: &PriceSeries,
    offsets: &[usize],
    future_points: usize,
    params: &ProjectionParams,
) -> Vec<Result<BacktestOutcome, ProjectionError>> {
    offsets
        .iter()
        .map(|&offset| run_backtest(full, offset, future_points, params))
        .collect()
}
