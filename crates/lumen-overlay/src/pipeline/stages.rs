use super::{CoverageMask, DrawUniforms, UiVertex};

/// Vertex stage result: what the rasterizer interpolates across a triangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    /// Clip-space position; `z = 0` (nearest plane), `w = 1`.
    pub clip: [f32; 4],
    pub color: [f32; 4],
    /// Normalized texture coordinate.
    pub tc: [f32; 2],
}

/// CPU reference of `vs_main`.
///
/// Maps a top-left-origin, +Y-down pixel position into the +Y-up `[-1, 1]` clip
/// square and divides the integer texel coordinate by the texture size.
#[inline]
pub fn vertex_stage(v: &UiVertex, uniforms: &DrawUniforms) -> VertexOutput {
    let screen = uniforms.screen_size();
    let tex = uniforms.tex_size();

    VertexOutput {
        clip: [
            2.0 * v.pos[0] / screen.x - 1.0,
            1.0 - 2.0 * v.pos[1] / screen.y,
            0.0,
            1.0,
        ],
        color: v.color_f32(),
        tc: [f32::from(v.tc[0]) / tex.x, f32::from(v.tc[1]) / tex.y],
    }
}

/// CPU reference of `fs_main` given an already sampled coverage value.
///
/// RGB passes through untouched; only alpha is scaled by the mask.
#[inline]
pub fn fragment_stage(color: [f32; 4], mask: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * mask]
}

/// Samples `mask` at the interpolated coordinate, then applies [`fragment_stage`].
///
/// The mask decides the filter; see [`Bilinear`](super::Bilinear).
#[inline]
pub fn shade_fragment<M>(color: [f32; 4], tc: [f32; 2], mask: &M) -> [f32; 4]
where
    M: CoverageMask + ?Sized,
{
    fragment_stage(color, mask.sample(tc))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::coords::Vec2;
    use crate::pipeline::{Bilinear, CoverageImage};

    fn uniforms(screen: (f32, f32), tex: (f32, f32)) -> DrawUniforms {
        DrawUniforms::new(Vec2::new(screen.0, screen.1), Vec2::new(tex.0, tex.1)).unwrap()
    }

    fn at(x: f32, y: f32) -> UiVertex {
        UiVertex::new([x, y], [255; 4], [0, 0])
    }

    // ── vertex stage: position ────────────────────────────────────────────

    #[test]
    fn top_left_maps_to_clip_top_left() {
        let out = vertex_stage(&at(0.0, 0.0), &uniforms((800.0, 600.0), (1.0, 1.0)));
        assert_eq!(out.clip, [-1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn bottom_right_maps_to_clip_bottom_right() {
        let out = vertex_stage(&at(800.0, 600.0), &uniforms((800.0, 600.0), (1.0, 1.0)));
        assert_eq!(out.clip, [1.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn screen_center_maps_to_origin() {
        let out = vertex_stage(&at(400.0, 300.0), &uniforms((800.0, 600.0), (1.0, 1.0)));
        assert_abs_diff_eq!(out.clip[0], 0.0);
        assert_abs_diff_eq!(out.clip[1], 0.0);
    }

    #[test]
    fn on_screen_positions_stay_in_clip_square() {
        let screens = [(800.0, 600.0), (1.0, 1.0), (1920.0, 1080.0), (333.3, 7.0)];
        for &(w, h) in &screens {
            let u = uniforms((w, h), (1.0, 1.0));
            for i in 0..=16 {
                for j in 0..=16 {
                    let p = at(w * i as f32 / 16.0, h * j as f32 / 16.0);
                    let c = vertex_stage(&p, &u).clip;
                    assert!((-1.0..=1.0).contains(&c[0]), "x {} out of range for {p:?}", c[0]);
                    assert!((-1.0..=1.0).contains(&c[1]), "y {} out of range for {p:?}", c[1]);
                }
            }
        }
    }

    #[test]
    fn y_axis_is_flipped() {
        let u = uniforms((100.0, 100.0), (1.0, 1.0));
        let upper = vertex_stage(&at(50.0, 10.0), &u).clip[1];
        let lower = vertex_stage(&at(50.0, 90.0), &u).clip[1];
        assert!(upper > lower);
    }

    #[test]
    fn depth_is_nearest_plane_regardless_of_position() {
        let u = uniforms((64.0, 64.0), (1.0, 1.0));
        for p in [at(0.0, 0.0), at(-500.0, 3.0), at(1e6, 1e6)] {
            let c = vertex_stage(&p, &u).clip;
            assert_eq!((c[2], c[3]), (0.0, 1.0));
        }
    }

    // ── vertex stage: texture coordinate and color ────────────────────────

    #[test]
    fn texel_center_of_atlas_normalizes_to_half() {
        let v = UiVertex::new([0.0, 0.0], [0; 4], [128, 128]);
        let out = vertex_stage(&v, &uniforms((800.0, 600.0), (256.0, 256.0)));
        assert_eq!(out.tc, [0.5, 0.5]);
    }

    #[test]
    fn in_range_texels_normalize_into_unit_square() {
        let u = uniforms((1.0, 1.0), (512.0, 300.0));
        for tx in (0..=512).step_by(37).chain([512]) {
            for ty in (0..=300).step_by(29).chain([300]) {
                let v = UiVertex::new([0.0; 2], [0; 4], [tx, ty]);
                let tc = vertex_stage(&v, &u).tc;
                assert!((0.0..=1.0).contains(&tc[0]) && (0.0..=1.0).contains(&tc[1]));
            }
        }
    }

    #[test]
    fn large_atlas_offsets_divide_exactly() {
        let v = UiVertex::new([0.0; 2], [0; 4], [u16::MAX, 4096]);
        let out = vertex_stage(&v, &uniforms((1.0, 1.0), (65535.0, 8192.0)));
        assert_eq!(out.tc, [1.0, 0.5]);
    }

    #[test]
    fn color_passes_through_normalized() {
        let v = UiVertex::new([3.0, 4.0], [255, 0, 0, 255], [0, 0]);
        let out = vertex_stage(&v, &uniforms((10.0, 10.0), (1.0, 1.0)));
        assert_eq!(out.color, [1.0, 0.0, 0.0, 1.0]);
    }

    // ── fragment stage ────────────────────────────────────────────────────

    #[test]
    fn half_coverage_halves_alpha() {
        assert_eq!(fragment_stage([1.0, 0.0, 0.0, 1.0], 0.5), [1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn zero_mask_is_transparent_but_keeps_rgb() {
        assert_eq!(fragment_stage([0.2, 0.4, 0.6, 0.8], 0.0), [0.2, 0.4, 0.6, 0.0]);
    }

    #[test]
    fn zero_alpha_stays_zero() {
        assert_eq!(fragment_stage([0.2, 0.4, 0.6, 0.0], 1.0)[3], 0.0);
    }

    #[test]
    fn full_mask_keeps_alpha_exactly() {
        for a in [0.0, 0.001, 0.37, 0.5, 1.0] {
            assert_eq!(fragment_stage([0.1, 0.2, 0.3, a], 1.0)[3], a);
        }
    }

    #[test]
    fn rgb_is_independent_of_texture_contents() {
        let color = [0.9, 0.3, 0.1, 0.7];
        let img = CoverageImage::from_pixels(2, 2, vec![0, 64, 200, 255]).unwrap();
        for uv in [[0.1, 0.1], [0.9, 0.1], [0.1, 0.9], [0.9, 0.9]] {
            let out = shade_fragment(color, uv, &img);
            assert_eq!(&out[..3], &color[..3]);
        }
    }

    #[test]
    fn alpha_is_product_of_color_and_sampled_mask() {
        let img = CoverageImage::from_pixels(2, 1, vec![51, 255]).unwrap();
        let out = shade_fragment([1.0, 1.0, 1.0, 0.5], [0.25, 0.5], &img);
        assert_abs_diff_eq!(out[3], 0.5 * 0.2, epsilon = 1e-6);
        let out = shade_fragment([1.0, 1.0, 1.0, 0.5], [0.75, 0.5], &img);
        assert_eq!(out[3], 0.5);
    }

    // ── both stages ───────────────────────────────────────────────────────

    #[test]
    fn nearest_sampler_reads_the_glyph_texel() {
        let mut atlas = CoverageImage::new(256, 256).unwrap();
        atlas.write_region(128, 128, 1, 1, &[255]).unwrap();

        let u = uniforms((800.0, 600.0), (256.0, 256.0));
        let v = UiVertex::new([400.0, 300.0], [255, 0, 0, 255], [128, 128]);
        let vs = vertex_stage(&v, &u);
        let px = shade_fragment(vs.color, vs.tc, &atlas);

        assert_eq!(px, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn linear_sampler_at_texel_corner_spreads_coverage() {
        // Integer tc lands on a texel corner; a linear sampler averages the
        // four texels that meet there.
        let mut atlas = CoverageImage::new(256, 256).unwrap();
        atlas.write_region(128, 128, 1, 1, &[255]).unwrap();

        let u = uniforms((800.0, 600.0), (256.0, 256.0));
        let v = UiVertex::new([400.0, 300.0], [255, 0, 0, 255], [128, 128]);
        let vs = vertex_stage(&v, &u);

        assert_eq!(shade_fragment(vs.color, vs.tc, &Bilinear(&atlas)), [1.0, 0.0, 0.0, 0.25]);
    }

    #[test]
    fn solid_block_reads_full_under_either_filter() {
        let mut atlas = CoverageImage::new(64, 64).unwrap();
        atlas.write_region(0, 0, 4, 4, &[255; 16]).unwrap();

        let u = uniforms((100.0, 100.0), (64.0, 64.0));
        let v = UiVertex::new([10.0, 10.0], [0, 255, 0, 128], [2, 2]);
        let vs = vertex_stage(&v, &u);

        let nearest = shade_fragment(vs.color, vs.tc, &atlas);
        let linear = shade_fragment(vs.color, vs.tc, &Bilinear(&atlas));
        assert_eq!(nearest, linear);
        assert_eq!(nearest[3], 128.0 / 255.0);
    }
}
