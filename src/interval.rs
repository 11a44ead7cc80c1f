use std::fmt;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DAY_MS: u64 = 86_400_000;

/// Parse a bar interval string into milliseconds.
///
/// Accepts the exchange-style suffixes `s/m/h/d/w/M` and the provider-style
/// `wk`/`mo` codes (e.g. "1h", "1d", "1wk", "1mo").
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("invalid interval '{}': expected format like '1d'", s))?;
    let (num_str, suffix) = s.split_at(split);
    if num_str.is_empty() {
        bail!("invalid interval '{}': expected format like '1d'", s);
    }
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => DAY_MS,
        "w" | "wk" => 7 * DAY_MS,
        "M" | "mo" => 30 * DAY_MS,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w/wk/M/mo",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

/// Bar granularity of a price series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    code: String,
    length_ms: u64,
}

impl Interval {
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        let length_ms = parse_interval_ms(code)?;
        Ok(Self {
            code: code.to_string(),
            length_ms,
        })
    }

    pub fn daily() -> Self {
        Self {
            code: "1d".to_string(),
            length_ms: DAY_MS,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn length_ms(&self) -> u64 {
        self.length_ms
    }

    pub fn is_intraday(&self) -> bool {
        self.length_ms < DAY_MS
    }

    /// strftime pattern used for every date string emitted for this interval.
    pub fn date_format(&self) -> &'static str {
        if self.is_intraday() {
            "%d-%b-%Y %H:%M"
        } else {
            "%d-%b-%Y"
        }
    }

    pub fn format_date(&self, timestamp: &DateTime<Utc>) -> String {
        timestamp.format(self.date_format()).to_string()
    }

    /// History window a data provider should be asked for.
    pub fn lookback_period(&self) -> &'static str {
        if self.is_intraday() {
            "1y"
        } else if self.length_ms == DAY_MS {
            "5y"
        } else {
            "max"
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::daily()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Interval::parse(&code).map_err(|e| serde::de::Error::custom(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_valid() {
        assert_eq!(parse_interval_ms("1m").unwrap(), 60_000);
        assert_eq!(parse_interval_ms("2h").unwrap(), 7_200_000);
        assert_eq!(parse_interval_ms("1d").unwrap(), 86_400_000);
        assert_eq!(parse_interval_ms("1wk").unwrap(), 604_800_000);
        assert_eq!(parse_interval_ms("1w").unwrap(), 604_800_000);
        assert_eq!(parse_interval_ms("1mo").unwrap(), 2_592_000_000);
        assert_eq!(parse_interval_ms("1M").unwrap(), 2_592_000_000);
    }

    #[test]
    fn parse_interval_rejects_invalid_inputs() {
        assert!(parse_interval_ms("").is_err());
        assert!(parse_interval_ms("d").is_err());
        assert!(parse_interval_ms("0d").is_err());
        assert!(parse_interval_ms("1x").is_err());
        assert!(parse_interval_ms("15").is_err());
    }

    #[test]
    fn date_format_depends_on_granularity() {
        assert_eq!(Interval::parse("1h").unwrap().date_format(), "%d-%b-%Y %H:%M");
        assert_eq!(Interval::parse("1d").unwrap().date_format(), "%d-%b-%Y");
        assert_eq!(Interval::parse("1wk").unwrap().date_format(), "%d-%b-%Y");
    }

    #[test]
    fn format_date_uses_interval_pattern() {
        let ts = DateTime::parse_from_rfc3339("2024-03-05T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(Interval::daily().format_date(&ts), "05-Mar-2024");
        assert_eq!(
            Interval::parse("1h").unwrap().format_date(&ts),
            "05-Mar-2024 14:30"
        );
    }

    #[test]
    fn lookback_period_per_interval() {
        assert_eq!(Interval::parse("1h").unwrap().lookback_period(), "1y");
        assert_eq!(Interval::parse("1d").unwrap().lookback_period(), "5y");
        assert_eq!(Interval::parse("1wk").unwrap().lookback_period(), "max");
    }
}
