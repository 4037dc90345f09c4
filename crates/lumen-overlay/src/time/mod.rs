//! Frame timing.
//!
//! - `FrameClock`: one per window, `tick()` once per presented frame
//! - `FpsCounter`: averaged frames-per-second readout for on-screen display

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
