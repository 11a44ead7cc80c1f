use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::backtest::{run_backtests, BacktestOutcome};
use crate::interval::Interval;
use crate::model::{ProjectionLine, RecentChange};
use crate::pattern::{build_projections, ProjectionParams};
use crate::source::PriceSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionJob {
    pub symbol: String,
    pub interval: Interval,
}

/// Every (symbol, interval) combination, symbols outermost.
pub fn jobs_for(symbols: &[String], intervals: &[Interval]) -> Vec<ProjectionJob> {
    symbols
        .iter()
        .flat_map(|symbol| {
            intervals.iter().map(move |interval| ProjectionJob {
                symbol: symbol.clone(),
                interval: interval.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub symbol: String,
    pub interval: String,
    pub latest_date: Option<String>,
    pub latest_close: Option<f64>,
    pub lines: Vec<ProjectionLine>,
    pub recent_changes: Vec<RecentChange>,
    pub error: Option<String>,
}

impl JobReport {
    fn failed(job: &ProjectionJob, error: String) -> Self {
        Self {
            symbol: job.symbol.clone(),
            interval: job.interval.code().to_string(),
            latest_date: None,
            latest_close: None,
            lines: Vec::new(),
            recent_changes: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub interval: String,
    pub outcomes: Vec<BacktestOutcome>,
    pub errors: Vec<String>,
}

impl BacktestReport {
    fn failed(job: &ProjectionJob, error: String) -> Self {
        Self {
            symbol: job.symbol.clone(),
            interval: job.interval.code().to_string(),
            outcomes: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Load one series and project it. Failures are folded into the report.
pub fn run_job(
    source: &dyn PriceSource,
    job: &ProjectionJob,
    params: &ProjectionParams,
    changes_window: usize,
) -> JobReport {
    let series = match source.load(&job.symbol, &job.interval) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("{:#}", e);
            tracing::warn!(symbol = %job.symbol, interval = %job.interval, error = %msg, "Failed to load price series");
            return JobReport::failed(job, msg);
        }
    };
    let lines = match build_projections(&series, params) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(symbol = %job.symbol, interval = %job.interval, error = %e, "Projection failed");
            return JobReport::failed(job, e.to_string());
        }
    };
    if lines.is_empty() {
        tracing::info!(symbol = %job.symbol, interval = %job.interval, "No repeated movement pattern found");
    }
    JobReport {
        symbol: job.symbol.clone(),
        interval: job.interval.code().to_string(),
        latest_date: series.last().map(|p| series.format_date(&p.timestamp)),
        latest_close: series.last().map(|p| p.close),
        lines,
        recent_changes: series.recent_changes(changes_window),
        error: None,
    }
}

pub fn run_backtest_job(
    source: &dyn PriceSource,
    job: &ProjectionJob,
    offsets: &[usize],
    future_points: usize,
    params: &ProjectionParams,
) -> BacktestReport {
    let mut report = BacktestReport {
        symbol: job.symbol.clone(),
        interval: job.interval.code().to_string(),
        outcomes: Vec::new(),
        errors: Vec::new(),
    };
    let series = match source.load(&job.symbol, &job.interval) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("{:#}", e);
            tracing::warn!(symbol = %job.symbol, interval = %job.interval, error = %msg, "Failed to load price series");
            report.errors.push(msg);
            return report;
        }
    };
    for (offset, result) in offsets
        .iter()
        .zip(run_backtests(&series, offsets, future_points, params))
    {
        match result {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(e) => report.errors.push(format!("offset {}: {}", offset, e)),
        }
    }
    report
}

/// Run `work` for every job on the blocking pool, returning results in job order.
/// A worker that dies is reported through `on_failure` in its job's slot.
async fn fan_out<T, F, G>(
    source: Arc<dyn PriceSource>,
    jobs: Vec<ProjectionJob>,
    work: F,
    on_failure: G,
) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(&dyn PriceSource, &ProjectionJob) -> T + Send + Sync + 'static,
    G: Fn(&ProjectionJob, String) -> T,
{
    let work = Arc::new(work);
    let mut set = JoinSet::new();
    let mut slot_of = HashMap::with_capacity(jobs.len());
    for (idx, job) in jobs.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        let work = Arc::clone(&work);
        let handle = set.spawn_blocking(move || work(source.as_ref(), &job));
        slot_of.insert(handle.id(), idx);
    }

    let mut slots: Vec<Option<T>> = jobs.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((id, item)) => {
                if let Some(&idx) = slot_of.get(&id) {
                    slots[idx] = Some(item);
                }
            }
            Err(e) => {
                let msg = format!("worker failed: {}", e);
                match slot_of.get(&e.id()) {
                    Some(&idx) => {
                        let job = &jobs[idx];
                        tracing::error!(symbol = %job.symbol, interval = %job.interval, error = %msg, "Projection worker failed");
                        slots[idx] = Some(on_failure(job, msg));
                    }
                    None => tracing::error!(error = %msg, "Projection worker failed"),
                }
            }
        }
    }

    slots
        .into_iter()
        .zip(&jobs)
        .map(|(slot, job)| match slot {
            Some(item) => item,
            None => on_failure(job, "worker finished without a result".to_string()),
        })
        .collect()
}

pub async fn project_jobs(
    source: Arc<dyn PriceSource>,
    jobs: Vec<ProjectionJob>,
    params: ProjectionParams,
    changes_window: usize,
) -> Vec<JobReport> {
    fan_out(
        source,
        jobs,
        move |src, job| run_job(src, job, &params, changes_window),
        JobReport::failed,
    )
    .await
}

pub async fn backtest_jobs(
    source: Arc<dyn PriceSource>,
    jobs: Vec<ProjectionJob>,
    offsets: Vec<usize>,
    future_points: usize,
    params: ProjectionParams,
) -> Vec<BacktestReport> {
    fan_out(
        source,
        jobs,
        move |src, job| run_backtest_job(src, job, &offsets, future_points, &params),
        BacktestReport::failed,
    )
    .await
}
