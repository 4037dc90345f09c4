use std::time::Instant;

use lumen_overlay::coords::{Rect, Vec2, Viewport};
use lumen_overlay::core::{App, AppControl, FrameCtx};
use lumen_overlay::render::{
    backdrop_extent, BackdropConfig, BackdropRenderer, OverlayConfig, OverlayRenderer,
};
use lumen_overlay::time::FpsCounter;
use winit::event::WindowEvent;
use winit::keyboard::{Key, NamedKey};

use crate::painter::{Painter, Rgba};
use crate::scene::BackdropSource;

/// Host settings.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Physical pixels per UI pixel.
    pub ui_scale: f32,
    pub backdrop: BackdropConfig,
    pub overlay: OverlayConfig,
    /// Text size in UI pixels.
    pub font_px: f32,
    pub clear: wgpu::Color,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            ui_scale: 2.0,
            backdrop: BackdropConfig { subsampling: 2 },
            overlay: OverlayConfig::default(),
            font_px: 12.0,
            clear: wgpu::Color::BLACK,
        }
    }
}

const PANEL_COLOR: Rgba = [16, 18, 24, 176];
const TEXT_COLOR: Rgba = [255, 255, 255, 255];
const PANEL_MARGIN: f32 = 4.0;
const PANEL_PADDING: f32 = 4.0;

/// Backdrop plus a HUD with the frame rate, frame time and surface size.
pub struct StudioApp {
    config: StudioConfig,
    source: BackdropSource,
    backdrop: BackdropRenderer,
    overlay: OverlayRenderer,
    painter: Painter,
    fps: FpsCounter,
}

impl StudioApp {
    pub fn new(config: StudioConfig, source: BackdropSource, painter: Painter) -> Self {
        Self {
            backdrop: BackdropRenderer::new(),
            overlay: OverlayRenderer::new(config.overlay.clone()),
            config,
            source,
            painter,
            fps: FpsCounter::new(Instant::now()),
        }
    }

    fn build_hud(&mut self, fps: f32, frame_dt: f32, physical: (u32, u32), viewport: Viewport) {
        let px = self.config.font_px;
        let lines = [
            format!("FPS: {fps:.2}"),
            format!("frame: {:.2} ms", frame_dt * 1000.0),
            format!("{}x{} @ {:.2}x", physical.0, physical.1, viewport.scale),
        ];

        self.painter.begin_frame(viewport.scale);

        let sizes: Vec<Vec2> = lines.iter().map(|l| self.painter.measure_text(l, px)).collect();
        let width = sizes.iter().map(|s| s.x).fold(0.0f32, f32::max);
        let height: f32 = sizes.iter().map(|s| s.y).sum();
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let inset = PANEL_MARGIN + PANEL_PADDING;
        let text_box = Rect::new(inset, inset, width, height);
        self.painter.rect(text_box.expand(PANEL_PADDING), PANEL_COLOR);

        let mut pen = text_box.origin;
        for (line, size) in lines.iter().zip(&sizes) {
            self.painter.text(pen, line, px, TEXT_COLOR);
            pen.y += size.y;
        }
    }
}

impl App for StudioApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let fps = self.fps.frame(ctx.time.now);
        let ui_scale = self.config.ui_scale;
        let viewport = ctx.viewport(ui_scale);
        if !viewport.is_valid() {
            return AppControl::Continue;
        }

        let size = ctx.gpu.size();
        let extent = backdrop_extent(size.width, size.height, self.config.backdrop.subsampling);
        let pending = match self.source.take_update(extent) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("backdrop: {err:#}");
                None
            }
        };

        self.build_hud(fps, ctx.time.dt, (size.width, size.height), viewport);

        let uploading = pending.is_some();
        let mut drawn = false;
        let Self { config, backdrop, overlay, painter, .. } = self;
        let control = ctx.render(ui_scale, config.clear, |rctx, target| {
            drawn = true;
            if let Some(image) = pending.as_ref() {
                if let Err(err) = backdrop.set_image(rctx, image) {
                    log::warn!("backdrop upload failed: {err}");
                }
            }
            backdrop.render(rctx, target);

            if let Some(coverage) = painter.take_dirty_coverage() {
                if let Err(err) = overlay.set_coverage(rctx, coverage) {
                    log::warn!("coverage upload failed: {err}");
                }
            }
            if let Err(err) = overlay.render(rctx, target, painter.mesh()) {
                log::warn!("overlay draw skipped: {err}");
            }
        });

        // Frame dropped on a surface error; upload again next time.
        if uploading && !drawn {
            self.source.invalidate();
        }
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hud_scale() {
        let config = StudioConfig::default();
        assert_eq!(config.ui_scale, 2.0);
        assert_eq!(config.backdrop.subsampling, 2);
    }

    #[test]
    fn hud_is_empty_without_font() {
        let painter = Painter::new(None).unwrap();
        let mut app = StudioApp::new(StudioConfig::default(), BackdropSource::gradient(), painter);
        app.build_hud(60.0, 0.016, (800, 600), Viewport::from_physical(800, 600, 2.0));
        assert!(app.painter.mesh().is_empty());
    }
}
