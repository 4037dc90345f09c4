use super::OverlayError;

/// How normalized coordinates outside `[0, 1]` resolve to a texel.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
}

impl AddressMode {
    /// Maps a texel index (possibly out of range) into `0..len`.
    #[inline]
    fn resolve(self, index: i64, len: u32) -> usize {
        let len = i64::from(len);
        let i = match self {
            AddressMode::ClampToEdge => index.clamp(0, len - 1),
            AddressMode::Repeat => index.rem_euclid(len),
        };
        i as usize
    }

    pub(crate) fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Anything the fragment stage can read a coverage value from.
pub trait CoverageMask {
    /// Returns coverage in `[0, 1]` at a normalized texture coordinate.
    fn sample(&self, uv: [f32; 2]) -> f32;
}

/// A constant mask, as if every texel held the same coverage.
impl CoverageMask for f32 {
    #[inline]
    fn sample(&self, _uv: [f32; 2]) -> f32 {
        *self
    }
}

/// Single-channel 8-bit coverage image, row-major, top row first.
///
/// This is the CPU twin of the `R8Unorm` texture bound to the overlay pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    address_mode: AddressMode,
}

impl CoverageImage {
    /// Creates a fully transparent image.
    pub fn new(width: u32, height: u32) -> Result<Self, OverlayError> {
        if width == 0 || height == 0 {
            return Err(OverlayError::EmptyImage { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            address_mode: AddressMode::default(),
        })
    }

    /// Wraps existing pixel data; `pixels.len()` must equal `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, OverlayError> {
        if width == 0 || height == 0 {
            return Err(OverlayError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(OverlayError::CoverageSizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels, address_mode: AddressMode::default() })
    }

    #[must_use]
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn address_mode(&self) -> AddressMode {
        self.address_mode
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Copies a `w × h` block of tightly packed rows into the image at `(x, y)`.
    ///
    /// The block must lie fully inside the image and `src.len()` must be `w * h`.
    pub fn write_region(
        &mut self,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        src: &[u8],
    ) -> Result<(), OverlayError> {
        let expected = w as usize * h as usize;
        let inside = x.checked_add(w).is_some_and(|r| r <= self.width)
            && y.checked_add(h).is_some_and(|b| b <= self.height);
        if src.len() != expected || !inside {
            return Err(OverlayError::CoverageSizeMismatch {
                width: w,
                height: h,
                expected,
                actual: src.len(),
            });
        }
        if expected == 0 {
            return Ok(());
        }

        let stride = self.width as usize;
        for (row, line) in src.chunks_exact(w as usize).enumerate() {
            let start = (y as usize + row) * stride + x as usize;
            self.pixels[start..start + w as usize].copy_from_slice(line);
        }
        Ok(())
    }

    /// Nearest-texel lookup, the same rule a `Nearest` GPU sampler applies.
    pub fn sample_nearest(&self, uv: [f32; 2]) -> u8 {
        let tx = (uv[0] * self.width as f32).floor() as i64;
        let ty = (uv[1] * self.height as f32).floor() as i64;
        let x = self.address_mode.resolve(tx, self.width);
        let y = self.address_mode.resolve(ty, self.height);
        self.pixels[y * self.width as usize + x]
    }

    /// Bilinear lookup, the rule a `Linear` GPU sampler applies: the four
    /// texels around `uv * size - 0.5` weighted by distance, edges resolved by
    /// the address mode. Returns coverage in `[0, 1]`.
    pub fn sample_linear(&self, uv: [f32; 2]) -> f32 {
        let fx = uv[0] * self.width as f32 - 0.5;
        let fy = uv[1] * self.height as f32 - 0.5;
        let (x0, y0) = (fx.floor(), fy.floor());
        let (wx, wy) = (fx - x0, fy - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);

        let texel = |x: i64, y: i64| {
            let x = self.address_mode.resolve(x, self.width);
            let y = self.address_mode.resolve(y, self.height);
            f32::from(self.pixels[y * self.width as usize + x]) / 255.0
        };

        let top = texel(x0, y0) * (1.0 - wx) + texel(x0 + 1, y0) * wx;
        let bottom = texel(x0, y0 + 1) * (1.0 - wx) + texel(x0 + 1, y0 + 1) * wx;
        top * (1.0 - wy) + bottom * wy
    }
}

/// An image read through a `Linear` sampler.
///
/// `CoverageImage` itself implements [`CoverageMask`] with nearest filtering;
/// wrap it in `Bilinear` to model the overlay renderer's default filter.
#[derive(Debug, Copy, Clone)]
pub struct Bilinear<'a>(pub &'a CoverageImage);

impl CoverageMask for Bilinear<'_> {
    #[inline]
    fn sample(&self, uv: [f32; 2]) -> f32 {
        self.0.sample_linear(uv)
    }
}

impl CoverageMask for CoverageImage {
    #[inline]
    fn sample(&self, uv: [f32; 2]) -> f32 {
        f32::from(self.sample_nearest(uv)) / 255.0
    }
}
