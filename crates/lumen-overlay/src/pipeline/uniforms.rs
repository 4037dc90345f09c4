use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;

use super::OverlayError;

/// Per-draw constants shared by every vertex of one overlay draw call.
///
/// Both extents are validated at construction, so a `DrawUniforms` value can
/// always be fed to the vertex stage without dividing by zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawUniforms {
    screen_size: Vec2,
    tex_size: Vec2,
}

impl DrawUniforms {
    pub fn new(screen_size: Vec2, tex_size: Vec2) -> Result<Self, OverlayError> {
        if !screen_size.is_positive_extent() {
            return Err(OverlayError::InvalidScreenSize {
                width: screen_size.x,
                height: screen_size.y,
            });
        }
        if !tex_size.is_positive_extent() {
            return Err(OverlayError::InvalidTexSize {
                width: tex_size.x,
                height: tex_size.y,
            });
        }
        Ok(Self { screen_size, tex_size })
    }

    /// Screen size in UI pixels.
    #[inline]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    /// Coverage texture size in texels.
    #[inline]
    pub fn tex_size(&self) -> Vec2 {
        self.tex_size
    }

    #[inline]
    pub fn to_gpu(&self) -> DrawUniformsGpu {
        DrawUniformsGpu {
            screen_size: self.screen_size.to_array(),
            tex_size: self.tex_size.to_array(),
        }
    }
}

/// std140-compatible uniform block matching `DrawUniforms` in `overlay.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawUniformsGpu {
    pub screen_size: [f32; 2],
    pub tex_size: [f32; 2],
}

impl DrawUniformsGpu {
    /// Minimum binding size for the uniform buffer.
    pub fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<Self>() as u64)
            .expect("DrawUniformsGpu has non-zero size by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_extents() {
        let u = DrawUniforms::new(Vec2::new(800.0, 600.0), Vec2::new(256.0, 128.0)).unwrap();
        assert_eq!(
            u.to_gpu(),
            DrawUniformsGpu { screen_size: [800.0, 600.0], tex_size: [256.0, 128.0] }
        );
    }

    #[test]
    fn rejects_zero_screen_size() {
        let err = DrawUniforms::new(Vec2::new(0.0, 600.0), Vec2::splat(1.0)).unwrap_err();
        assert_eq!(err, OverlayError::InvalidScreenSize { width: 0.0, height: 600.0 });
    }

    #[test]
    fn rejects_negative_or_nan_tex_size() {
        assert!(matches!(
            DrawUniforms::new(Vec2::splat(1.0), Vec2::new(-1.0, 4.0)),
            Err(OverlayError::InvalidTexSize { .. })
        ));
        assert!(matches!(
            DrawUniforms::new(Vec2::splat(1.0), Vec2::new(4.0, f32::NAN)),
            Err(OverlayError::InvalidTexSize { .. })
        ));
    }

    #[test]
    fn rejects_infinite_screen_size() {
        assert!(DrawUniforms::new(Vec2::new(f32::INFINITY, 1.0), Vec2::splat(1.0)).is_err());
    }

    #[test]
    fn gpu_block_is_sixteen_bytes() {
        assert_eq!(DrawUniformsGpu::min_binding_size().get(), 16);
    }
}
