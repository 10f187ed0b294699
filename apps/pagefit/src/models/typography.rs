//! Typography state and its bounded degradation ladder.
//!
//! Degradation order is fixed: font size, then margins, then line spacing.
//! Every step clamps at the configured floor, so no sequence of steps can
//! produce a value below `TypographyLimits`.

use serde::{Deserialize, Serialize};

/// Tolerance for float comparisons against the floors (0.75 - 0.1 - 0.1 ≠ 0.55).
const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypographySettings {
    pub font_size_pt: f64,
    pub margin_inches: f64,
    pub line_spacing: f64,
}

impl Default for TypographySettings {
    /// Starting point for every invocation: 10pt body, 0.75" margins, 1.2 leading.
    fn default() -> Self {
        Self {
            font_size_pt: 10.0,
            margin_inches: 0.75,
            line_spacing: 1.2,
        }
    }
}

/// Floors and step sizes for the degradation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypographyLimits {
    pub min_font_pt: f64,
    pub min_margin_in: f64,
    pub min_line_spacing: f64,
    pub font_step_pt: f64,
    pub margin_step_in: f64,
    pub line_spacing_step: f64,
}

impl Default for TypographyLimits {
    fn default() -> Self {
        Self {
            min_font_pt: 9.0,
            min_margin_in: 0.5,
            min_line_spacing: 1.0,
            font_step_pt: 0.5,
            margin_step_in: 0.1,
            line_spacing_step: 0.05,
        }
    }
}

/// Which knob a degradation step turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypographyStep {
    FontSize,
    Margin,
    LineSpacing,
}

impl TypographySettings {
    /// All three values at their floors.
    pub fn floor(limits: &TypographyLimits) -> Self {
        Self {
            font_size_pt: limits.min_font_pt,
            margin_inches: limits.min_margin_in,
            line_spacing: limits.min_line_spacing,
        }
    }

    /// Raises any value that starts below its floor.
    pub fn clamped(self, limits: &TypographyLimits) -> Self {
        Self {
            font_size_pt: self.font_size_pt.max(limits.min_font_pt),
            margin_inches: self.margin_inches.max(limits.min_margin_in),
            line_spacing: self.line_spacing.max(limits.min_line_spacing),
        }
    }

    pub fn is_exhausted(&self, limits: &TypographyLimits) -> bool {
        !above(self.font_size_pt, limits.min_font_pt)
            && !above(self.margin_inches, limits.min_margin_in)
            && !above(self.line_spacing, limits.min_line_spacing)
    }

    /// Applies the next step of the ladder. Returns `None` once every value sits at its floor.
    pub fn degrade(&self, limits: &TypographyLimits) -> Option<(Self, TypographyStep)> {
        if above(self.font_size_pt, limits.min_font_pt) {
            let next = Self {
                font_size_pt: step_down(self.font_size_pt, limits.font_step_pt, limits.min_font_pt),
                ..*self
            };
            return Some((next, TypographyStep::FontSize));
        }
        if above(self.margin_inches, limits.min_margin_in) {
            let next = Self {
                margin_inches: step_down(
                    self.margin_inches,
                    limits.margin_step_in,
                    limits.min_margin_in,
                ),
                ..*self
            };
            return Some((next, TypographyStep::Margin));
        }
        if above(self.line_spacing, limits.min_line_spacing) {
            let next = Self {
                line_spacing: step_down(
                    self.line_spacing,
                    limits.line_spacing_step,
                    limits.min_line_spacing,
                ),
                ..*self
            };
            return Some((next, TypographyStep::LineSpacing));
        }
        None
    }
}

fn above(value: f64, floor: f64) -> bool {
    value > floor + EPSILON
}

/// Subtracts `step` and snaps to `floor` when the result lands within tolerance or below it.
fn step_down(value: f64, step: f64, floor: f64) -> f64 {
    let next = value - step;
    if next <= floor + EPSILON {
        floor
    } else {
        next
    }
}
