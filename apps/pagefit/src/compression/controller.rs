//! Compression controller: the adaptive render → measure → compress loop.
//!
//! Each invocation walks a fixed ladder until the document fits `max_pages`:
//!
//! 1. single-page targets are relevance-pruned before the first render
//! 2. font size, then margins, then line spacing step down to their floors
//! 3. the aggressive tier runs at floor typography (also forced on the final loop iteration)
//! 4. a terminal aggressive pass, then the minimal placeholder
//!
//! The render budget is `max_attempts + 1` calls. The minimal pass is the only
//! render whose failure is fatal. An expired time budget skips the rest of the
//! loop, the same as running out of attempts.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::compression::attempt::{CompressionAttempt, LayoutRequest, LayoutResult, Strategy};
use crate::config::LayoutConfig;
use crate::errors::{LayoutError, RenderError};
use crate::layout::{RenderRequest, RenderedDocument, Renderer};
use crate::models::{DocumentHeader, ResumeContent, TypographySettings};
use crate::selection::pruner::truncate_chars;
use crate::selection::{minimal_placeholder, prune_aggressively, prune_by_relevance, RelevanceContext};

/// Header strings are clipped to this many characters in the minimal pass.
const MINIMAL_HEADER_CHARS: usize = 80;

pub struct CompressionController<R: Renderer> {
    config: LayoutConfig,
    renderer: R,
}

impl<R: Renderer> CompressionController<R> {
    pub fn new(config: LayoutConfig, renderer: R) -> Self {
        Self { config, renderer }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Runs one invocation. The request is only read; every candidate is a fresh copy.
    pub fn layout(&self, request: &LayoutRequest) -> Result<LayoutResult, LayoutError> {
        self.layout_with_budget(request, self.config.time_budget())
    }

    /// Like `layout`, with `time_budget` replacing the configured one. The
    /// deadline starts when this call does.
    pub fn layout_with_budget(
        &self,
        request: &LayoutRequest,
        time_budget: Option<Duration>,
    ) -> Result<LayoutResult, LayoutError> {
        let started = Instant::now();
        if request.max_pages == 0 {
            return Err(LayoutError::InvalidRequest(
                "max_pages must be at least 1".to_string(),
            ));
        }
        self.config
            .validate()
            .map_err(|e| LayoutError::InvalidRequest(format!("{e:#}")))?;

        let run_id = Uuid::new_v4();
        let span = info_span!("layout", %run_id, max_pages = request.max_pages);
        let _guard = span.enter();

        let config = &self.config;
        let max_pages = request.max_pages;
        let limits = config.typography_limits();
        let floor = TypographySettings::floor(&limits);
        let context = RelevanceContext::new(&request.keywords);
        let deadline = time_budget.map(|budget| started + budget);

        let mut run = Run {
            renderer: &self.renderer,
            run_id,
            attempts: Vec::new(),
        };

        let mut content = request.content.clone();
        let mut typography = config.initial_typography.clamped(&limits);
        let mut strategy = Strategy::None;
        let mut aggressive_applied = false;
        let mut last_candidate: Option<(ResumeContent, TypographySettings)> = None;

        if max_pages == 1 {
            content = prune_by_relevance(&content, &context, max_pages, &config.pruning);
            strategy = Strategy::RelevancePruning;
        }

        info!(
            experiences = content.experiences.len(),
            skills = content.skills.len(),
            keywords = context.len(),
            max_attempts = config.max_attempts,
            "Starting layout"
        );

        for attempt in 0..config.max_attempts {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(attempt, "Time budget exhausted, skipping to terminal pass");
                break;
            }

            // The last loop iteration is reserved for the aggressive tier.
            if attempt > 0 && attempt + 1 == config.max_attempts && !aggressive_applied {
                info!(attempt, "Final attempt, applying aggressive pruning at floor typography");
                content = prune_aggressively(&content, &context, &config.pruning);
                typography = floor;
                strategy = Strategy::AggressivePruning;
                aggressive_applied = true;
            }

            let outcome = run.render(&request.header, &content, &typography, strategy);
            last_candidate = Some((content.clone(), typography));

            match outcome {
                Ok(doc) if doc.page_count.pages() <= max_pages => {
                    info!(
                        attempt,
                        pages = doc.page_count.pages(),
                        strategy = ?strategy,
                        "Layout fits"
                    );
                    return Ok(run.finish(doc, strategy, false));
                }
                Ok(doc) => {
                    info!(
                        attempt,
                        pages = doc.page_count.pages(),
                        max_pages,
                        font_size_pt = typography.font_size_pt,
                        margin_inches = typography.margin_inches,
                        line_spacing = typography.line_spacing,
                        "Layout exceeds page limit"
                    );
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Render failed, advancing strategy");
                }
            }

            match typography.degrade(&limits) {
                Some((next, step)) => {
                    debug!(attempt, step = ?step, from = ?typography, to = ?next, "Degrading typography");
                    typography = next;
                    strategy = strategy.max(Strategy::TypographyDegradation);
                }
                None if !aggressive_applied => {
                    info!(attempt, "Typography at floors, applying aggressive pruning");
                    content = prune_aggressively(&content, &context, &config.pruning);
                    typography = floor;
                    strategy = Strategy::AggressivePruning;
                    aggressive_applied = true;
                }
                None => break,
            }
        }

        // Terminal aggressive pass. Skipped when this exact candidate was just measured.
        let terminal = prune_aggressively(&content, &context, &config.pruning);
        let already_measured = last_candidate
            .as_ref()
            .is_some_and(|(c, t)| *c == terminal && *t == floor);
        let budget = config.max_attempts + 1;

        if !already_measured && run.render_calls() + 2 <= budget {
            match run.render(&request.header, &terminal, &floor, Strategy::AggressivePruning) {
                Ok(doc) if doc.page_count.pages() <= max_pages => {
                    info!(pages = doc.page_count.pages(), "Terminal aggressive pass fits");
                    return Ok(run.finish(doc, Strategy::AggressivePruning, false));
                }
                Ok(doc) => {
                    info!(pages = doc.page_count.pages(), "Terminal aggressive pass exceeds page limit");
                }
                Err(e) => warn!(error = %e, "Terminal aggressive render failed"),
            }
        }

        // Minimal placeholder. Its result is accepted whatever the page count;
        // an overflow is flagged on the result, not reported as failure.
        let header = DocumentHeader {
            name: truncate_chars(&request.header.name, MINIMAL_HEADER_CHARS),
            contact_line: truncate_chars(&request.header.contact_line, MINIMAL_HEADER_CHARS),
        };
        let minimal = minimal_placeholder();
        match run.render(&header, &minimal, &floor, Strategy::MinimalFallback) {
            Ok(doc) => {
                let overflowed = doc.page_count.pages() > max_pages;
                if overflowed {
                    error!(
                        pages = doc.page_count.pages(),
                        max_pages, "Minimal placeholder still exceeds page limit"
                    );
                } else {
                    warn!(pages = doc.page_count.pages(), "Fell back to minimal placeholder");
                }
                Ok(run.finish(doc, Strategy::MinimalFallback, overflowed))
            }
            Err(source) => {
                error!(error = %source, "Minimal render failed");
                Err(LayoutError::LayoutFailure {
                    render_calls: run.render_calls(),
                    source,
                })
            }
        }
    }
}

/// Per-invocation bookkeeping: the attempt log and the render call count.
struct Run<'a, R: Renderer> {
    renderer: &'a R,
    run_id: Uuid,
    attempts: Vec<CompressionAttempt>,
}

impl<'a, R: Renderer> Run<'a, R> {
    fn render_calls(&self) -> u32 {
        self.attempts.len() as u32
    }

    fn render(
        &mut self,
        header: &DocumentHeader,
        content: &ResumeContent,
        typography: &TypographySettings,
        strategy: Strategy,
    ) -> Result<RenderedDocument, RenderError> {
        let outcome = self.renderer.render(&RenderRequest {
            header,
            content,
            typography,
        });
        self.attempts.push(CompressionAttempt {
            attempt_index: self.render_calls(),
            strategy,
            typography: *typography,
            content_snapshot: content.clone(),
            page_count: outcome.as_ref().ok().map(|doc| doc.page_count),
            error: outcome.as_ref().err().map(ToString::to_string),
            rendered_at: Utc::now(),
        });
        outcome
    }

    fn finish(self, doc: RenderedDocument, strategy: Strategy, overflowed: bool) -> LayoutResult {
        let RenderedDocument {
            artifact,
            page_count,
        } = doc;
        LayoutResult {
            run_id: self.run_id,
            artifact,
            page_count,
            succeeded: true,
            overflowed,
            strategy_applied: strategy,
            final_attempt_index: self.render_calls().saturating_sub(1),
            measurement_approximate: page_count.is_approximate(),
            render_calls: self.render_calls(),
            attempts: self.attempts,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
