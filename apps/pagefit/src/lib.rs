//! Adaptive page-constrained résumé layout.
//!
//! A `CompressionController` renders résumé content through a `Renderer`,
//! measures the page count, and applies progressively stronger compression
//! (typography degradation, relevance pruning, aggressive pruning, a minimal
//! placeholder) until the document fits the caller's page limit.

pub mod compression;
pub mod config;
pub mod errors;
pub mod layout;
pub mod models;
pub mod selection;

pub use compression::{layout_batch, CompressionController, LayoutRequest, LayoutResult, Strategy};
pub use config::{Config, LayoutConfig};
pub use errors::{LayoutError, MeasurementUnavailable, RenderError};
pub use layout::{PageCount, PdfRenderer, RenderRequest, RenderedDocument, Renderer};
