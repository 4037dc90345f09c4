use super::Vec2;

/// Axis-aligned rectangle in UI pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Grows the rect by `amount` on every side.
    #[inline]
    pub fn expand(self, amount: f32) -> Self {
        Self::new(
            self.origin.x - amount,
            self.origin.y - amount,
            self.size.x + 2.0 * amount,
            self.size.y + 2.0 * amount,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_is_origin_plus_size() {
        assert_eq!(Rect::new(10.0, 20.0, 5.0, 6.0).max(), Vec2::new(15.0, 26.0));
    }

    #[test]
    fn expand_grows_every_side() {
        let r = Rect::new(10.0, 10.0, 20.0, 10.0).expand(4.0);
        assert_eq!(r, Rect::new(6.0, 6.0, 28.0, 18.0));
    }

    #[test]
    fn zero_area_is_empty() {
        assert!(Rect::new(0.0, 0.0, 0.0, 4.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
