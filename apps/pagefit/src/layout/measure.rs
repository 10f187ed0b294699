//! Page counting for rendered artifacts.
//!
//! The exact count comes from re-parsing the PDF page tree. When that fails the
//! count is estimated from the artifact size and flagged as approximate.

use lopdf::Document;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::MeasurementUnavailable;

/// Rough size of one rendered page, used only when the page tree is unreadable.
pub const BYTES_PER_PAGE_ESTIMATE: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pages", rename_all = "snake_case")]
pub enum PageCount {
    Exact(u32),
    /// Size-derived estimate. Never treat as authoritative.
    Approximate(u32),
}

impl PageCount {
    pub fn pages(&self) -> u32 {
        match self {
            PageCount::Exact(n) | PageCount::Approximate(n) => *n,
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, PageCount::Approximate(_))
    }
}

/// Reads the page count from the document's page tree.
pub fn count_pages(artifact: &[u8]) -> Result<u32, MeasurementUnavailable> {
    let doc = Document::load_mem(artifact).map_err(|e| MeasurementUnavailable {
        reason: format!("Failed to parse PDF: {e}"),
    })?;
    match doc.get_pages().len() {
        0 => Err(MeasurementUnavailable {
            reason: "PDF page tree is empty".to_string(),
        }),
        n => Ok(n as u32),
    }
}

/// `max(1, bytes / 50_000)`.
pub fn estimate_from_size(len: usize) -> u32 {
    ((len / BYTES_PER_PAGE_ESTIMATE) as u32).max(1)
}

/// Exact count when readable, otherwise the flagged size estimate.
pub fn measure(artifact: &[u8]) -> PageCount {
    match count_pages(artifact) {
        Ok(n) => PageCount::Exact(n),
        Err(e) => {
            let estimate = estimate_from_size(artifact.len());
            warn!(
                error = %e,
                bytes = artifact.len(),
                estimate,
                "Falling back to size-based page estimate"
            );
            PageCount::Approximate(estimate)
        }
    }
}
