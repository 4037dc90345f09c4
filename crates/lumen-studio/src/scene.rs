use std::path::Path;

use anyhow::{Context, Result};
use lumen_overlay::render::Backdrop;

/// Where the backdrop pixels come from.
pub enum BackdropSource {
    /// A decoded file, uploaded once and stretched to the window.
    Image { image: Backdrop, uploaded: bool },
    /// Sky gradient regenerated whenever the backdrop extent changes.
    Gradient { extent: Option<(u32, u32)> },
}

impl BackdropSource {
    pub fn gradient() -> Self {
        Self::Gradient { extent: None }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("failed to open backdrop image {}", path.display()))?
            .into_rgba8();
        let (width, height) = decoded.dimensions();
        let image = Backdrop::from_rgba8(width, height, decoded.into_raw())?;
        log::info!("backdrop image {} ({width}x{height})", path.display());
        Ok(Self::Image { image, uploaded: false })
    }

    /// Forgets the last upload so the next `take_update` yields an image.
    pub fn invalidate(&mut self) {
        match self {
            Self::Image { uploaded, .. } => *uploaded = false,
            Self::Gradient { extent } => *extent = None,
        }
    }

    /// Image to upload for a target of `extent` pixels, if it changed.
    ///
    /// The source counts the returned image as uploaded.
    pub fn take_update(&mut self, extent: (u32, u32)) -> Result<Option<Backdrop>> {
        match self {
            Self::Image { image, uploaded } => {
                if std::mem::replace(uploaded, true) {
                    Ok(None)
                } else {
                    Ok(Some(image.clone()))
                }
            }
            Self::Gradient { extent: current } => {
                if *current == Some(extent) {
                    return Ok(None);
                }
                *current = Some(extent);
                Ok(Some(sky_gradient(extent.0, extent.1)?))
            }
        }
    }
}

/// Vertical white-to-blue ramp, top row blue.
pub fn sky_gradient(width: u32, height: u32) -> Result<Backdrop> {
    const TOP: [f32; 3] = [128.0, 178.0, 255.0];
    const BOTTOM: [f32; 3] = [255.0, 255.0, 255.0];

    let denom = height.saturating_sub(1).max(1) as f32;
    let image = Backdrop::from_fn(width, height, |_, y| {
        let t = y as f32 / denom;
        let c = |i: usize| (TOP[i] + (BOTTOM[i] - TOP[i]) * t).round() as u8;
        [c(0), c(1), c(2), 255]
    })?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(image: &Backdrop, x: u32, y: u32) -> [u8; 4] {
        let (w, _) = image.size();
        let i = ((y * w + x) * 4) as usize;
        let p = &image.rgba()[i..i + 4];
        [p[0], p[1], p[2], p[3]]
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let image = sky_gradient(4, 3).unwrap();
        assert_eq!(pixel(&image, 0, 0), [128, 178, 255, 255]);
        assert_eq!(pixel(&image, 3, 2), [255, 255, 255, 255]);
        assert_eq!(pixel(&image, 1, 0), pixel(&image, 2, 0));
    }

    #[test]
    fn single_row_gradient_is_top_color() {
        let image = sky_gradient(2, 1).unwrap();
        assert_eq!(pixel(&image, 0, 0), [128, 178, 255, 255]);
    }

    #[test]
    fn gradient_regenerates_only_on_extent_change() {
        let mut source = BackdropSource::gradient();
        let first = source.take_update((8, 4)).unwrap().unwrap();
        assert_eq!(first.size(), (8, 4));
        assert!(source.take_update((8, 4)).unwrap().is_none());
        assert_eq!(source.take_update((16, 8)).unwrap().unwrap().size(), (16, 8));
    }

    #[test]
    fn image_is_uploaded_once() {
        let image = Backdrop::from_rgba8(1, 1, vec![1, 2, 3, 4]).unwrap();
        let mut source = BackdropSource::Image { image: image.clone(), uploaded: false };
        assert_eq!(source.take_update((100, 100)).unwrap(), Some(image));
        assert!(source.take_update((200, 100)).unwrap().is_none());
        source.invalidate();
        assert!(source.take_update((200, 100)).unwrap().is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(BackdropSource::load(Path::new("/nonexistent/backdrop.png")).is_err());
    }
}
