// Layout: composes résumé content into pages, writes PDF bytes, measures them.
// Pure CPU work. Async callers must run it inside tokio::task::spawn_blocking.

pub mod compose;
pub mod flow;
pub mod font_metrics;
pub mod measure;
pub mod pdf;
pub mod renderer;

pub use measure::{PageCount, BYTES_PER_PAGE_ESTIMATE};
pub use renderer::{PdfRenderer, RenderRequest, RenderedDocument, Renderer, MIN_CONTENT_WIDTH_PT};
