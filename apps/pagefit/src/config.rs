use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::flow::PageGeometry;
use crate::layout::MIN_CONTENT_WIDTH_PT;
use crate::models::{TypographyLimits, TypographySettings};
use crate::selection::PruningThresholds;

/// Tunables for one compression controller.
///
/// Passed explicitly at construction; the engine never reads the environment itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_font_pt: f64,
    pub min_margin_in: f64,
    /// Top-level loop iterations, at least 2 so the aggressive tier always gets
    /// one. The controller renders at most `max_attempts + 1` times.
    pub max_attempts: u32,
    pub initial_typography: TypographySettings,
    pub font_step_pt: f64,
    pub margin_step_in: f64,
    pub line_spacing_step: f64,
    pub pruning: PruningThresholds,
    /// Wall-clock budget for the loop. Expiry falls through to the terminal pass.
    pub time_budget_ms: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let limits = TypographyLimits::default();
        Self {
            min_font_pt: limits.min_font_pt,
            min_margin_in: limits.min_margin_in,
            max_attempts: 5,
            initial_typography: TypographySettings::default(),
            font_step_pt: limits.font_step_pt,
            margin_step_in: limits.margin_step_in,
            line_spacing_step: limits.line_spacing_step,
            pruning: PruningThresholds::default(),
            time_budget_ms: None,
        }
    }
}

impl LayoutConfig {
    pub fn typography_limits(&self) -> TypographyLimits {
        TypographyLimits {
            min_font_pt: self.min_font_pt,
            min_margin_in: self.min_margin_in,
            min_line_spacing: 1.0,
            font_step_pt: self.font_step_pt,
            margin_step_in: self.margin_step_in,
            line_spacing_step: self.line_spacing_step,
        }
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_font_pt.is_finite() && self.min_font_pt > 0.0) {
            bail!("min_font_pt must be a positive number, got {}", self.min_font_pt);
        }
        if !(self.min_margin_in.is_finite() && self.min_margin_in >= 0.0) {
            bail!("min_margin_in must be non-negative, got {}", self.min_margin_in);
        }
        for (name, margin) in [
            ("min_margin_in", self.min_margin_in),
            ("initial_typography.margin_inches", self.initial_typography.margin_inches),
        ] {
            let width = PageGeometry::us_letter(margin).content_width();
            if width < MIN_CONTENT_WIDTH_PT {
                bail!("{name} of {margin}in leaves {width}pt of content width, need {MIN_CONTENT_WIDTH_PT}pt");
            }
        }
        if self.max_attempts < 2 {
            bail!("max_attempts must be at least 2, got {}", self.max_attempts);
        }
        for (name, step) in [
            ("font_step_pt", self.font_step_pt),
            ("margin_step_in", self.margin_step_in),
            ("line_spacing_step", self.line_spacing_step),
        ] {
            if !(step.is_finite() && step > 0.0) {
                bail!("{name} must be a positive number, got {step}");
            }
        }
        self.pruning.validate()
    }
}

/// Process-level configuration for the `pagefit` binary, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub layout: LayoutConfig,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = LayoutConfig::default();
        let layout = LayoutConfig {
            min_font_pt: parse_or(&lookup, "PAGEFIT_MIN_FONT_PT", defaults.min_font_pt)?,
            min_margin_in: parse_or(&lookup, "PAGEFIT_MIN_MARGIN_IN", defaults.min_margin_in)?,
            max_attempts: parse_or(&lookup, "PAGEFIT_MAX_ATTEMPTS", defaults.max_attempts)?,
            time_budget_ms: match lookup("PAGEFIT_TIME_BUDGET_MS") {
                Some(raw) => Some(
                    raw.trim()
                        .parse::<u64>()
                        .context("PAGEFIT_TIME_BUDGET_MS must be a whole number of milliseconds")?,
                ),
                None => None,
            },
            ..defaults
        };
        layout.validate().context("Invalid layout configuration")?;

        Ok(Config {
            layout,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
