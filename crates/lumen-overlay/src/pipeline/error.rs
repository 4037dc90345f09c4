use thiserror::Error;

/// Host-side contract violations detected before a draw is submitted.
///
/// The shading stages themselves cannot fail; every variant here describes
/// input that would otherwise divide by zero, sample outside of a texture that
/// does not exist, or read past the end of the vertex buffer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("screen size must be finite and strictly positive, got {width}x{height}")]
    InvalidScreenSize { width: f32, height: f32 },

    #[error("texture size must be finite and strictly positive, got {width}x{height}")]
    InvalidTexSize { width: f32, height: f32 },

    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("coverage image {width}x{height} needs {expected} bytes, got {actual}")]
    CoverageSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("backdrop image {width}x{height} needs {expected} RGBA bytes, got {actual}")]
    BackdropSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("texture {width}x{height} exceeds the device limit of {max}")]
    TextureTooLarge { width: u32, height: u32, max: u32 },

    #[error("index {index} at position {position} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
}
