use anyhow::{bail, Context, Result};
use chrono::Duration;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::backtest::DEFAULT_BACKTEST_OFFSETS;
use crate::interval::Interval;
use crate::pattern::{ProjectionParams, DEFAULT_MAX_PATTERN_LEN, DEFAULT_MIN_PATTERN_LEN};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Upper bound on `date_step_secs * future_points` (50 years). Keeps every
/// projected date inside chrono's range and the step count inside `i32`.
pub const MAX_PROJECTION_SPAN_SECS: u64 = 50 * 365 * 86_400;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub watchlist: Vec<WatchlistEntry>,
    /// Named constituent lists, e.g. an ETF's top holdings.
    #[serde(default)]
    pub groups: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub future_points: usize,
    pub num_lines: usize,
    pub min_pattern_len: usize,
    pub max_pattern_len: usize,
    pub date_step_secs: u64,
    pub intervals: Vec<Interval>,
    pub recent_changes_window: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            future_points: 10,
            num_lines: 5,
            min_pattern_len: DEFAULT_MIN_PATTERN_LEN,
            max_pattern_len: DEFAULT_MAX_PATTERN_LEN,
            date_step_secs: 86_400,
            intervals: ["1wk", "1d", "1h"]
                .iter()
                .filter_map(|c| Interval::parse(c).ok())
                .collect(),
            recent_changes_window: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub offsets: Vec<usize>,
    pub future_points: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_BACKTEST_OFFSETS.to_vec(),
            future_points: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistEntry {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ProjectionConfig {
    pub fn params(&self) -> ProjectionParams {
        ProjectionParams {
            future_points: self.future_points,
            num_lines: self.num_lines,
            min_pattern_len: self.min_pattern_len,
            max_pattern_len: self.max_pattern_len,
            date_step: i64::try_from(self.date_step_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.min_pattern_len == 0 {
            bail!("projection.min_pattern_len must be >= 1");
        }
        if self.min_pattern_len > self.max_pattern_len {
            bail!(
                "projection.min_pattern_len ({}) must not exceed max_pattern_len ({})",
                self.min_pattern_len,
                self.max_pattern_len
            );
        }
        if self.num_lines == 0 {
            bail!("projection.num_lines must be >= 1");
        }
        if self.date_step_secs == 0 {
            bail!("projection.date_step_secs must be > 0");
        }
        check_span(self.date_step_secs, self.future_points, "projection.future_points")?;
        if self.intervals.is_empty() {
            bail!("projection.intervals must list at least one interval");
        }
        Ok(())
    }
}

fn normalize_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for symbol in symbols {
        let s = symbol.trim().to_ascii_uppercase();
        if !s.is_empty() && !out.iter().any(|v| v == &s) {
            out.push(s);
        }
    }
    out
}

fn check_span(date_step_secs: u64, future_points: usize, field: &str) -> Result<()> {
    let span = u64::try_from(future_points)
        .ok()
        .and_then(|n| n.checked_mul(date_step_secs));
    match span {
        Some(secs) if secs <= MAX_PROJECTION_SPAN_SECS => Ok(()),
        _ => bail!(
            "projection.date_step_secs ({}) * {} ({}) must not exceed {} seconds",
            date_step_secs,
            field,
            future_points,
            MAX_PROJECTION_SPAN_SECS
        ),
    }
}

impl Config {
    /// Watchlist symbols, upper-cased and de-duplicated in declaration order.
    pub fn watchlist_symbols(&self) -> Vec<String> {
        normalize_symbols(self.watchlist.iter().map(|e| e.symbol.as_str()))
    }

    /// Symbols for a run: the watchlist when `requested` is empty, otherwise
    /// each entry as given, with `@NAME` expanding to the members of group `NAME`.
    pub fn resolve_symbols(&self, requested: &[String]) -> Result<Vec<String>> {
        if requested.is_empty() {
            return Ok(self.watchlist_symbols());
        }
        let mut raw: Vec<&str> = Vec::new();
        for arg in requested {
            match arg.strip_prefix('@') {
                Some(name) => {
                    let members = self
                        .groups
                        .iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(name))
                        .map(|(_, v)| v)
                        .with_context(|| format!("unknown symbol group `{}`", name))?;
                    raw.extend(members.iter().map(String::as_str));
                }
                None => raw.push(arg.as_str()),
            }
        }
        Ok(normalize_symbols(raw))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config")?;
        config.projection.validate()?;
        check_span(
            config.projection.date_step_secs,
            config.backtest.future_points,
            "backtest.future_points",
        )?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str).with_context(|| format!("invalid {}", path.display()))
    }

    /// Load `PROJECTOR_CONFIG` (default `config/default.toml`), after reading `.env`.
    /// `PROJECTOR_DATA_DIR` overrides `data.dir`.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = match explicit_path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("PROJECTOR_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };
        let mut config = Self::load_from(&path)?;

        if let Ok(dir) = std::env::var("PROJECTOR_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data.dir = PathBuf::from(dir);
            }
        }
        Ok(config)
    }
}
