//! Region geometry shared by detection, ordering, and glyph cropping.

use serde::{Deserialize, Serialize};

/// Raw axis-aligned region reported by a region detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }
}

/// Detected ink region in source-image pixel coordinates.
///
/// `source_index` refers back to the detector's output order and is stable
/// for the lifetime of one extraction pass. It is not a reading-order rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub source_index: usize,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32, source_index: usize) -> Self {
        Self {
            x,
            y,
            w,
            h,
            source_index,
        }
    }

    pub fn from_region(region: Region, source_index: usize) -> Self {
        Self::new(region.x, region.y, region.w, region.h, source_index)
    }

    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, self.w, self.h)
    }

    pub fn area(&self) -> u64 {
        self.region().area()
    }

    /// Box center as `(cx, cy)`.
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    /// Clamp the box to an image of `width`×`height`.
    ///
    /// Returns `None` when nothing of the box remains inside the image.
    pub fn clamped_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.w.min(width - self.x);
        let h = self.h.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self { w, h, ..*self })
    }
}
