//! Request, attempt log and result types for one layout invocation.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::PageCount;
use crate::models::{DocumentHeader, ResumeContent, TypographySettings};

/// The strongest compression step applied so far. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    None,
    TypographyDegradation,
    RelevancePruning,
    AggressivePruning,
    MinimalFallback,
}

/// One render call and what came of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionAttempt {
    pub attempt_index: u32,
    /// Strongest strategy in effect for this candidate.
    pub strategy: Strategy,
    pub typography: TypographySettings,
    pub content_snapshot: ResumeContent,
    /// `None` when the render failed.
    pub page_count: Option<PageCount>,
    pub error: Option<String>,
    pub rendered_at: DateTime<Utc>,
}

/// One layout job, as read by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    #[serde(flatten)]
    pub header: DocumentHeader,
    pub content: ResumeContent,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub run_id: Uuid,
    pub artifact: Bytes,
    pub page_count: PageCount,
    /// Always true once an artifact is returned, including the minimal pass.
    pub succeeded: bool,
    /// Set when the minimal placeholder was accepted while still over `max_pages`.
    pub overflowed: bool,
    pub strategy_applied: Strategy,
    pub final_attempt_index: u32,
    pub measurement_approximate: bool,
    pub render_calls: u32,
    pub attempts: Vec<CompressionAttempt>,
}

/// Serializable view of a `LayoutResult` without the artifact bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub run_id: Uuid,
    pub pages: u32,
    pub page_count: PageCount,
    pub succeeded: bool,
    pub overflowed: bool,
    pub strategy_applied: Strategy,
    pub final_attempt_index: u32,
    pub measurement_approximate: bool,
    pub render_calls: u32,
    pub artifact_bytes: usize,
    pub attempts: Vec<AttemptSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptSummary {
    pub attempt_index: u32,
    pub strategy: Strategy,
    pub font_size_pt: f64,
    pub margin_inches: f64,
    pub line_spacing: f64,
    pub pages: Option<u32>,
    pub error: Option<String>,
    pub rendered_at: DateTime<Utc>,
}

impl LayoutResult {
    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary {
            run_id: self.run_id,
            pages: self.page_count.pages(),
            page_count: self.page_count,
            succeeded: self.succeeded,
            overflowed: self.overflowed,
            strategy_applied: self.strategy_applied,
            final_attempt_index: self.final_attempt_index,
            measurement_approximate: self.measurement_approximate,
            render_calls: self.render_calls,
            artifact_bytes: self.artifact.len(),
            attempts: self
                .attempts
                .iter()
                .map(|a| AttemptSummary {
                    attempt_index: a.attempt_index,
                    strategy: a.strategy,
                    font_size_pt: a.typography.font_size_pt,
                    margin_inches: a.typography.margin_inches,
                    line_spacing: a.typography.line_spacing,
                    pages: a.page_count.map(|p| p.pages()),
                    error: a.error.clone(),
                    rendered_at: a.rendered_at,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order_by_severity() {
        assert!(Strategy::None < Strategy::TypographyDegradation);
        assert!(Strategy::TypographyDegradation < Strategy::RelevancePruning);
        assert!(Strategy::RelevancePruning < Strategy::AggressivePruning);
        assert!(Strategy::AggressivePruning < Strategy::MinimalFallback);
    }

    #[test]
    fn test_request_parses_flat_header() {
        let json = r#"{
            "name": "Sam Lee",
            "contact_line": "sam@example.com",
            "content": { "summary": "Engineer", "skills": ["Rust"] },
            "keywords": ["rust"],
            "max_pages": 2
        }"#;
        let request: LayoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.header.name, "Sam Lee");
        assert_eq!(request.header.contact_line, "sam@example.com");
        assert_eq!(request.content.skills, vec!["Rust".to_string()]);
        assert_eq!(request.max_pages, 2);
    }

    #[test]
    fn test_request_defaults_to_one_page() {
        let request: LayoutRequest =
            serde_json::from_str(r#"{ "name": "A", "content": {} }"#).unwrap();
        assert_eq!(request.max_pages, 1);
        assert!(request.keywords.is_empty());
    }

    #[test]
    fn test_summary_omits_artifact() {
        let result = LayoutResult {
            run_id: Uuid::nil(),
            artifact: Bytes::from_static(b"%PDF-1.5"),
            page_count: PageCount::Exact(1),
            succeeded: true,
            overflowed: false,
            strategy_applied: Strategy::None,
            final_attempt_index: 0,
            measurement_approximate: false,
            render_calls: 1,
            attempts: Vec::new(),
        };
        let json = serde_json::to_value(result.summary()).unwrap();
        assert_eq!(json["pages"], 1);
        assert_eq!(json["strategy_applied"], "none");
        assert_eq!(json["artifact_bytes"], 8);
        assert_eq!(json["overflowed"], false);
        assert!(json.get("artifact").is_none());
    }
}
