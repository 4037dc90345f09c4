use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use lumen_overlay::coords::{Rect, Vec2};
use lumen_overlay::pipeline::{CoverageImage, UiMesh, UiVertex};

use crate::atlas::{AtlasRegion, GlyphAtlas, ATLAS_SIZE};

/// Straight-alpha RGBA8 vertex color.
pub type Rgba = [u8; 4];

/// Immediate-mode mesh builder.
///
/// Each frame starts with [`begin_frame`](Self::begin_frame); shapes are
/// appended in paint order, so later calls land on top. Solid fills sample the
/// atlas' solid block, glyphs sample their own atlas region.
///
/// Geometry is in UI pixels. Text is laid out and rasterized in physical
/// pixels (`px * scale`) so one glyph texel covers one physical pixel.
pub struct Painter {
    mesh: UiMesh,
    atlas: GlyphAtlas<GlyphRasterConfig>,
    font: Option<fontdue::Font>,
    layout: Layout<()>,
    scale: f32,
}

impl Painter {
    pub fn new(font: Option<fontdue::Font>) -> anyhow::Result<Self> {
        Ok(Self {
            mesh: UiMesh::new(),
            atlas: GlyphAtlas::new(ATLAS_SIZE)?,
            font,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            scale: 1.0,
        })
    }

    /// Clears the mesh. `scale` is the viewport's physical pixels per UI pixel.
    pub fn begin_frame(&mut self, scale: f32) {
        self.mesh.clear();
        self.scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    }

    #[inline]
    pub fn mesh(&self) -> &UiMesh {
        &self.mesh
    }

    /// The atlas image if it changed since the last call.
    pub fn take_dirty_coverage(&mut self) -> Option<&CoverageImage> {
        if self.atlas.take_dirty() { Some(self.atlas.image()) } else { None }
    }

    /// Fills `rect` with a flat color.
    pub fn rect(&mut self, rect: Rect, color: Rgba) {
        if rect.is_empty() {
            return;
        }
        let tc = self.atlas.solid_texel();
        let (min, max) = (rect.min(), rect.max());
        self.mesh.push_quad([
            UiVertex::new([min.x, min.y], color, tc),
            UiVertex::new([max.x, min.y], color, tc),
            UiVertex::new([max.x, max.y], color, tc),
            UiVertex::new([min.x, max.y], color, tc),
        ]);
    }

    /// Size of `text` laid out at `px`, in UI pixels. Zero without a font.
    pub fn measure_text(&mut self, text: &str, px: f32) -> Vec2 {
        if !self.lay_out(Vec2::zero(), text, px) {
            return Vec2::zero();
        }
        let width = self
            .layout
            .glyphs()
            .iter()
            .map(|g| g.x + g.width as f32)
            .fold(0.0f32, f32::max);
        Vec2::new(width, self.layout.height()) / self.scale
    }

    /// Draws `text` with its line box's top-left corner at `origin`.
    pub fn text(&mut self, origin: Vec2, text: &str, px: f32, color: Rgba) {
        if !self.lay_out(origin, text, px) {
            return;
        }
        let Some(font) = self.font.as_ref() else { return; };

        for g in self.layout.glyphs() {
            if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                continue;
            }
            let region = self.atlas.get_or_insert_with(g.key, || {
                let (metrics, bitmap) = font.rasterize_config(g.key);
                (metrics.width as u32, metrics.height as u32, bitmap)
            });
            let Some(region) = region else { continue; };

            let dst = glyph_rect(g.x, g.y, region, self.scale);
            push_glyph(&mut self.mesh, dst, region, color);
        }
    }

    /// Runs the text layout in physical pixels; returns `false` when no font
    /// is loaded.
    fn lay_out(&mut self, origin: Vec2, text: &str, px: f32) -> bool {
        let Some(font) = self.font.as_ref() else { return false; };
        let origin = origin * self.scale;
        self.layout.reset(&LayoutSettings {
            x: origin.x,
            y: origin.y,
            ..LayoutSettings::default()
        });
        self.layout.append(&[font], &TextStyle::new(text, px * self.scale, 0));
        true
    }
}

/// UI-pixel quad for a glyph placed at physical `(x, y)`, snapped to the
/// physical pixel grid so texels map one to one.
fn glyph_rect(x: f32, y: f32, region: AtlasRegion, scale: f32) -> Rect {
    Rect::new(
        x.round() / scale,
        y.round() / scale,
        f32::from(region.w) / scale,
        f32::from(region.h) / scale,
    )
}

fn push_glyph(mesh: &mut UiMesh, dst: Rect, region: AtlasRegion, color: Rgba) {
    let (min, max) = (dst.min(), dst.max());
    let (t0, t1) = (region.min(), region.max());
    mesh.push_quad([
        UiVertex::new([min.x, min.y], color, [t0[0], t0[1]]),
        UiVertex::new([max.x, min.y], color, [t1[0], t0[1]]),
        UiVertex::new([max.x, max.y], color, [t1[0], t1[1]]),
        UiVertex::new([min.x, max.y], color, [t0[0], t1[1]]),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_uses_solid_texel_for_every_corner() {
        let mut p = Painter::new(None).unwrap();
        p.rect(Rect::new(10.0, 20.0, 30.0, 40.0), [1, 2, 3, 4]);
        let mesh = p.mesh();
        assert_eq!(mesh.vertices.len(), 4);
        assert!(mesh.vertices.iter().all(|v| v.tc == [2, 2] && v.color == [1, 2, 3, 4]));
        assert_eq!(mesh.vertices[2].pos, [40.0, 60.0]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn empty_rect_is_skipped() {
        let mut p = Painter::new(None).unwrap();
        p.rect(Rect::new(0.0, 0.0, 0.0, 10.0), [255; 4]);
        assert!(p.mesh().is_empty());
    }

    #[test]
    fn text_without_font_draws_nothing() {
        let mut p = Painter::new(None).unwrap();
        p.text(Vec2::new(1.0, 1.0), "FPS: 60.00", 16.0, [255; 4]);
        assert!(p.mesh().is_empty());
        assert_eq!(p.measure_text("abc", 16.0), Vec2::zero());
    }

    #[test]
    fn glyph_quad_maps_corners_to_region() {
        let mut mesh = UiMesh::new();
        let region = AtlasRegion { x: 8, y: 4, w: 5, h: 7 };
        push_glyph(&mut mesh, Rect::new(100.0, 50.0, 5.0, 7.0), region, [255; 4]);
        let tcs: Vec<_> = mesh.vertices.iter().map(|v| v.tc).collect();
        assert_eq!(tcs, vec![[8, 4], [13, 4], [13, 11], [8, 11]]);
        assert_eq!(mesh.vertices[2].pos, [105.0, 57.0]);
    }

    #[test]
    fn glyph_quad_covers_one_physical_pixel_per_texel() {
        let region = AtlasRegion { x: 5, y: 0, w: 12, h: 14 };
        for scale in [0.5, 1.0, 2.0, 4.0] {
            let r = glyph_rect(20.0, 8.0, region, scale);
            assert_eq!(r.size * scale, Vec2::new(12.0, 14.0), "scale {scale}");
            assert_eq!(r.origin * scale, Vec2::new(20.0, 8.0), "scale {scale}");
        }
    }

    #[test]
    fn glyph_origin_snaps_to_physical_pixels() {
        let region = AtlasRegion { x: 0, y: 0, w: 4, h: 4 };
        let r = glyph_rect(10.6, 3.2, region, 2.0);
        assert_eq!(r.origin, Vec2::new(5.5, 1.5));
    }

    #[test]
    fn rects_stay_in_ui_pixels_at_any_scale() {
        let mut p = Painter::new(None).unwrap();
        p.begin_frame(2.0);
        p.rect(Rect::new(10.0, 20.0, 30.0, 40.0), [255; 4]);
        assert_eq!(p.mesh().vertices[2].pos, [40.0, 60.0]);
    }

    #[test]
    fn invalid_scale_falls_back_to_one() {
        let mut p = Painter::new(None).unwrap();
        p.begin_frame(0.0);
        assert_eq!(p.scale, 1.0);
        p.begin_frame(f32::NAN);
        assert_eq!(p.scale, 1.0);
    }

    #[test]
    fn begin_frame_clears_geometry_but_not_atlas() {
        let mut p = Painter::new(None).unwrap();
        assert!(p.take_dirty_coverage().is_some());
        p.rect(Rect::new(0.0, 0.0, 1.0, 1.0), [255; 4]);
        p.begin_frame(1.0);
        assert!(p.mesh().is_empty());
        assert!(p.take_dirty_coverage().is_none());
    }
}
