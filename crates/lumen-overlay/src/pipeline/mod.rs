//! The overlay shading pipeline.
//!
//! Two stages make up one draw:
//! - the vertex stage maps UI pixel positions to clip space and normalizes
//!   integer texel coordinates by the coverage texture size,
//! - the fragment stage multiplies the interpolated color alpha by the red
//!   channel of the coverage texture.
//!
//! The GPU version lives in `shaders/overlay.wgsl`. The functions in `stages`
//! run the same arithmetic on the CPU; they are what the tests exercise and what
//! hosts can use to hit-test or debug overlay geometry without a device.
//!
//! Texture filtering is the sampler's job, so the CPU side takes the mask as a
//! [`CoverageMask`]: a bare [`CoverageImage`] samples like a `Nearest`
//! sampler, [`Bilinear`] like the renderer's default `Linear` one.

mod coverage;
mod error;
mod mesh;
mod stages;
mod uniforms;
mod vertex;

pub use coverage::{AddressMode, Bilinear, CoverageImage, CoverageMask};
pub use error::OverlayError;
pub use mesh::UiMesh;
pub use stages::{fragment_stage, shade_fragment, vertex_stage, VertexOutput};
pub use uniforms::{DrawUniforms, DrawUniformsGpu};
pub use vertex::UiVertex;

/// WGSL source of both stages (`vs_main`, `fs_main`).
pub const OVERLAY_WGSL: &str = include_str!("shaders/overlay.wgsl");

#[cfg(test)]
mod tests {
    use naga::valid::{Capabilities, ValidationFlags, Validator};
    use naga::ShaderStage;

    use super::OVERLAY_WGSL;

    #[test]
    fn overlay_shader_parses_and_validates() {
        let module = naga::front::wgsl::parse_str(OVERLAY_WGSL).expect("overlay.wgsl parses");
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .expect("overlay.wgsl validates");

        let entries: Vec<_> =
            module.entry_points.iter().map(|e| (e.name.as_str(), e.stage)).collect();
        assert_eq!(
            entries,
            vec![("vs_main", ShaderStage::Vertex), ("fs_main", ShaderStage::Fragment)]
        );
    }

    #[test]
    fn overlay_shader_binds_uniforms_texture_and_sampler() {
        let module = naga::front::wgsl::parse_str(OVERLAY_WGSL).expect("overlay.wgsl parses");
        let mut bindings: Vec<u32> = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| var.binding.as_ref())
            .filter(|b| b.group == 0)
            .map(|b| b.binding)
            .collect();
        bindings.sort_unstable();
        assert_eq!(bindings, vec![0, 1, 2]);
    }
}
