//! Lumen overlay crate.
//!
//! Renders an immediate-mode UI mesh on top of a separately produced image.
//! The `pipeline` module holds the data contract and both shading stages;
//! everything else is the wgpu/winit plumbing a host needs to drive them.

pub mod pipeline;
pub mod render;

pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod time;
pub mod window;
