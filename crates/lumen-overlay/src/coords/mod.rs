//! Coordinate types shared by the pipeline, renderers and host code.
//!
//! Canonical CPU space:
//! - UI pixels (physical pixels divided by the UI scale)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Conversion to clip space happens in the vertex stage using the draw uniforms.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
