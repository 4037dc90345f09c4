//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers, textures) and create
//! them lazily on first use, rebuilding only what a change invalidates.
//!
//! Draw order within a frame:
//! 1. `BackdropRenderer` blits the separately rendered image,
//! 2. `OverlayRenderer` composites the UI mesh on top with alpha-over blending.

mod backdrop;
mod blend;
mod ctx;
mod overlay;

pub use backdrop::{backdrop_extent, Backdrop, BackdropConfig, BackdropRenderer};
pub use ctx::{RenderCtx, RenderTarget};
pub use overlay::{CoverageFilter, OverlayConfig, OverlayRenderer};
