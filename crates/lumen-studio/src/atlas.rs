use std::collections::HashMap;
use std::hash::Hash;

use lumen_overlay::pipeline::{CoverageImage, OverlayError};

pub const ATLAS_SIZE: u32 = 512;
const GLYPH_PADDING: u32 = 1; // pixels between entries
const SOLID_BLOCK: u32 = 4;

/// Texel rectangle of one atlas entry, in the integer units the vertex stage expects.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AtlasRegion {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl AtlasRegion {
    #[inline]
    pub fn min(self) -> [u16; 2] {
        [self.x, self.y]
    }

    #[inline]
    pub fn max(self) -> [u16; 2] {
        [self.x + self.w, self.y + self.h]
    }
}

/// Shelf-packed coverage atlas.
///
/// A fully covered block is reserved at the origin so solid fills can share
/// the glyph texture; its center is [`solid_texel`](Self::solid_texel). Entries
/// are placed left to right and wrap to a new shelf when a row runs out.
/// Nothing is ever evicted: once an entry does not fit, the atlas reports full.
pub struct GlyphAtlas<K> {
    image: CoverageImage,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
    dirty: bool,
    entries: HashMap<K, AtlasRegion>,
}

impl<K> GlyphAtlas<K>
where
    K: Hash + Eq,
{
    pub fn new(size: u32) -> Result<Self, OverlayError> {
        let mut image = CoverageImage::new(size, size)?;
        let block = SOLID_BLOCK.min(size);
        image.write_region(0, 0, block, block, &vec![255; (block * block) as usize])?;

        Ok(Self {
            image,
            cursor_x: block + GLYPH_PADDING,
            cursor_y: 0,
            row_height: block,
            full: false,
            dirty: true,
            entries: HashMap::new(),
        })
    }

    /// Texel coordinate whose neighborhood is fully covered under any filter.
    #[inline]
    pub fn solid_texel(&self) -> [u16; 2] {
        let c = (SOLID_BLOCK / 2) as u16;
        [c, c]
    }

    #[inline]
    pub fn image(&self) -> &CoverageImage {
        &self.image
    }

    /// Returns whether the image changed since the last call, clearing the flag.
    #[inline]
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Returns the cached region for `key`, rasterizing via `raster` on a miss.
    ///
    /// `raster` yields `(width, height, coverage)` with tightly packed rows.
    /// Returns `None` when the glyph is empty or the atlas has no room left.
    pub fn get_or_insert_with<F>(&mut self, key: K, raster: F) -> Option<AtlasRegion>
    where
        F: FnOnce() -> (u32, u32, Vec<u8>),
    {
        if let Some(region) = self.entries.get(&key) {
            return Some(*region);
        }
        let (w, h, bitmap) = raster();
        let region = self.place(w, h, &bitmap)?;
        self.entries.insert(key, region);
        Some(region)
    }

    fn place(&mut self, w: u32, h: u32, bitmap: &[u8]) -> Option<AtlasRegion> {
        if self.full || w == 0 || h == 0 {
            return None;
        }
        let size = self.image.width();

        if self.cursor_x + w > size {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = 0;
            self.row_height = 0;
        }

        if w > size || self.cursor_y + h > size {
            log::warn!("glyph atlas is full ({size}x{size}); some glyphs will not be drawn");
            self.full = true;
            return None;
        }

        let (x, y) = (self.cursor_x, self.cursor_y);
        if let Err(err) = self.image.write_region(x, y, w, h, bitmap) {
            log::warn!("glyph atlas: rejected bitmap: {err}");
            return None;
        }

        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        self.dirty = true;

        Some(AtlasRegion { x: x as u16, y: y as u16, w: w as u16, h: h as u16 })
    }
}
