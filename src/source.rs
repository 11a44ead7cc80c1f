use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::AppError;
use crate::interval::Interval;
use crate::model::{PricePoint, PriceSeries};

/// Supplies historical closes for a (symbol, interval) pair.
pub trait PriceSource: Send + Sync {
    fn load(&self, symbol: &str, interval: &Interval) -> Result<PriceSeries>;
}

/// Reads `<dir>/<SYMBOL>_<interval>.json`, an array of `{"timestamp", "close"}` objects.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str, interval: &Interval) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.json",
            symbol.trim().to_ascii_uppercase(),
            interval.code()
        ))
    }
}

fn read_points(path: &Path) -> Result<Vec<PricePoint>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let points: Vec<PricePoint> = serde_json::from_str(&raw)?;
    if let Some(bad) = points.iter().position(|p| !p.close.is_finite() || p.close <= 0.0) {
        return Err(AppError::Source(format!(
            "close at row {} must be a positive number",
            bad
        )));
    }
    Ok(points)
}

impl PriceSource for JsonFileSource {
    fn load(&self, symbol: &str, interval: &Interval) -> Result<PriceSeries> {
        let path = self.path_for(symbol, interval);
        let points = read_points(&path).with_context(|| {
            format!(
                "failed to load {} {} (lookback {}) from {}",
                symbol,
                interval,
                interval.lookback_period(),
                path.display()
            )
        })?;
        tracing::debug!(symbol, interval = %interval, count = points.len(), "Loaded price bars");
        let series = PriceSeries::new(symbol, interval.clone(), points)
            .map_err(AppError::from)
            .with_context(|| format!("bad bar order in {}", path.display()))?;
        Ok(series)
    }
}
