use thiserror::Error;

/// Raised by a renderer when the content or typography it was handed cannot be laid out.
///
/// The compression controller absorbs these on every attempt except the final
/// minimal pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Malformed content in {field}: {reason}")]
    MalformedContent { field: String, reason: String },

    #[error("Invalid typography: {0}")]
    InvalidTypography(String),

    #[error("PDF encoding error: {0}")]
    Encode(String),
}

/// The artifact does not expose a page count we can read back.
/// Callers fall back to a size-derived estimate flagged as approximate.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Page count unavailable: {reason}")]
pub struct MeasurementUnavailable {
    pub reason: String,
}

/// Errors that reach the caller of the layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid layout request: {0}")]
    InvalidRequest(String),

    /// The terminal minimal render itself failed. Nothing else is left to try.
    #[error("Layout failed after {render_calls} render calls: {source}")]
    LayoutFailure {
        render_calls: u32,
        #[source]
        source: RenderError,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LayoutError {
    /// Stable machine-readable code, used in the CLI's JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            LayoutError::InvalidRequest(_) => "INVALID_REQUEST",
            LayoutError::LayoutFailure { .. } => "LAYOUT_FAILURE",
            LayoutError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
