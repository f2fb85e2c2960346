//! Build orchestration: the image-building controller, the full animate flow and previews.

/// Render -> encode entry point.
pub mod animate;
/// Parallel image build driver.
pub mod controller;
/// Sequential preview of selected frames.
pub mod preview;
