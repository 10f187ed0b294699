// Compression: the render → measure → compress state machine and its batch runner.
// The controller is synchronous; `batch` moves invocations onto spawn_blocking.

pub mod attempt;
pub mod batch;
pub mod controller;

pub use attempt::{
    AttemptSummary, CompressionAttempt, LayoutRequest, LayoutResult, LayoutSummary, Strategy,
};
pub use batch::layout_batch;
pub use controller::CompressionController;
