//! Top-level application orchestration.
//!
//! This module owns run configuration (defaults plus optional environment
//! overrides) and re-exports the pipeline entry points:
//! - `analyze` / `analyze_with_config` for already-materialized histories
//! - `analyze_from_source` when a `HistorySource` supplies them

use std::time::Duration;

use chrono::{Datelike, Local};

use crate::domain::{AnalysisConfig, DEFAULT_HORIZON, DEFAULT_YEAR_LOW, SolverOptions, YearRange};
use crate::error::ConfigError;

pub mod pipeline;

pub use pipeline::{BatchResult, EntityOutcome, analyze, analyze_entity, analyze_from_source, analyze_with_config};

const ENV_YEAR_LOW: &str = "CITECAST_YEAR_LOW";
const ENV_YEAR_HIGH: &str = "CITECAST_YEAR_HIGH";
const ENV_HORIZON: &str = "CITECAST_HORIZON";
const ENV_MAX_ITERATIONS: &str = "CITECAST_MAX_ITERATIONS";
const ENV_TIME_BUDGET_MS: &str = "CITECAST_TIME_BUDGET_MS";

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year_range: YearRange {
                low: DEFAULT_YEAR_LOW,
                high: Local::now().year(),
            },
            horizon: DEFAULT_HORIZON,
            solver: SolverOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults, overridden by `CITECAST_*` variables (a `.env` file is loaded
    /// first when present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let low = parse_var(&lookup, ENV_YEAR_LOW)?.unwrap_or(defaults.year_range.low);
        let high = parse_var(&lookup, ENV_YEAR_HIGH)?.unwrap_or(defaults.year_range.high);
        let horizon = parse_var(&lookup, ENV_HORIZON)?.unwrap_or(defaults.horizon);

        let max_iterations = parse_var(&lookup, ENV_MAX_ITERATIONS)?.unwrap_or(defaults.solver.max_iterations);
        if max_iterations == 0 {
            return Err(ConfigError::InvalidSetting(format!("{ENV_MAX_ITERATIONS} must be > 0")));
        }
        let time_budget = parse_var::<u64, _>(&lookup, ENV_TIME_BUDGET_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.solver.time_budget);

        Ok(Self {
            year_range: YearRange::new(low, high)?,
            horizon,
            solver: SolverOptions {
                max_iterations,
                time_budget,
                ..defaults.solver
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|_| ConfigError::InvalidEnv {
        var: key.to_string(),
        value: raw,
    })
}
