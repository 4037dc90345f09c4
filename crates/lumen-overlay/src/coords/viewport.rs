use super::Vec2;

const MIN_SCALE: f32 = 0.25;
const MAX_SCALE: f32 = 8.0;

/// Render target size in UI pixels plus the physical-to-UI pixel ratio.
///
/// The overlay uses `size()` as its `screen_size` uniform, so vertex positions
/// produced by the host must be expressed in the same UI pixel space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Physical pixels per UI pixel.
    pub scale: f32,
}

impl Viewport {
    /// Builds a viewport from a physical pixel size and a UI scale.
    ///
    /// `scale` is clamped to `[0.25, 8.0]`; a scale of 2 halves the UI pixel
    /// extent so every UI element covers four times as many physical pixels.
    pub fn from_physical(width: u32, height: u32, scale: f32) -> Self {
        let scale = if scale.is_finite() { scale.clamp(MIN_SCALE, MAX_SCALE) } else { 1.0 };
        Self {
            width: width as f32 / scale,
            height: height as f32 / scale,
            scale,
        }
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.size().is_positive_extent()
    }
}
