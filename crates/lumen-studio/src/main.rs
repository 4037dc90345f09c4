mod app;
mod atlas;
mod painter;
mod scene;

use std::path::PathBuf;

use anyhow::Result;
use lumen_overlay::device::GpuInit;
use lumen_overlay::logging::{init_logging, LoggingConfig};
use lumen_overlay::window::{Runtime, RuntimeConfig};

use app::{StudioApp, StudioConfig};
use painter::Painter;
use scene::BackdropSource;

/// `lumen-studio [BACKDROP_IMAGE]`
fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let source = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => BackdropSource::load(&path)?,
        None => BackdropSource::gradient(),
    };

    let font = load_font();
    if font.is_none() {
        log::warn!("no system font found; HUD text disabled");
    }

    let app = StudioApp::new(StudioConfig::default(), source, Painter::new(font)?);
    let config = RuntimeConfig { title: "Lumen".to_string(), ..RuntimeConfig::default() };
    Runtime::run(config, GpuInit::default(), app)
}

fn load_font() -> Option<fontdue::Font> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .find_map(|p| {
        let bytes = std::fs::read(p).ok()?;
        match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
            Ok(font) => {
                log::info!("font: {p}");
                Some(font)
            }
            Err(err) => {
                log::warn!("font {p}: {err}");
                None
            }
        }
    })
}
