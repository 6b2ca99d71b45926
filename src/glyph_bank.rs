//! Character-to-glyph bitmap store built by extraction and read by layout.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use image::{GrayImage, Luma};

use crate::geometry::BoundingBox;
use crate::reading_order::ReadingOrder;

/// Background intensity used for glyph padding and non-ink pixels.
pub const PAPER: u8 = 255;

/// Normalized, padded glyph raster with dark ink on a light background.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    bitmap: GrayImage,
}

impl Glyph {
    pub fn new(bitmap: GrayImage) -> Self {
        Self { bitmap }
    }

    pub fn bitmap(&self) -> &GrayImage {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn into_bitmap(self) -> GrayImage {
        self.bitmap
    }
}

/// Mapping from character to glyph.
///
/// Any `char` is a valid key, including punctuation that needs an alias when
/// written to disk (see [`crate::glyph_io`]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphBank {
    glyphs: HashMap<char, Glyph>,
}

impl GlyphBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Insert or replace the glyph for `ch`.
    pub fn insert(&mut self, ch: char, glyph: Glyph) -> Option<Glyph> {
        self.glyphs.insert(ch, glyph)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Glyph)> {
        self.glyphs.iter().map(|(ch, glyph)| (*ch, glyph))
    }

    /// Characters in the bank, sorted.
    pub fn characters(&self) -> Vec<char> {
        let mut chars: Vec<char> = self.glyphs.keys().copied().collect();
        chars.sort_unstable();
        chars
    }
}

/// Source rasters and geometry a bank is cropped from.
#[derive(Clone, Copy, Debug)]
pub struct GlyphSource<'a> {
    /// Grayscale scan with dark ink on light paper.
    pub gray: &'a GrayImage,
    /// Binary ink mask of the same size (non-zero marks ink).
    pub ink_mask: &'a GrayImage,
    /// Boxes that survived the minimum-area filter.
    pub boxes: &'a [BoundingBox],
}

/// Crop one box into a padded glyph.
///
/// Ink pixels (per the mask) keep their source darkness; everything else
/// becomes paper. The crop is placed at `(padding, padding)` inside a
/// `(w + 2·padding) × (h + 2·padding)` paper raster.
pub fn crop_glyph(source: &GlyphSource<'_>, bbox: &BoundingBox, padding: u32) -> Option<Glyph> {
    let (img_w, img_h) = source.gray.dimensions();
    let bbox = bbox.clamped_to(img_w, img_h)?;
    let mask_in_bounds = source.ink_mask.dimensions() == (img_w, img_h);

    let out_w = bbox.w + 2 * padding;
    let out_h = bbox.h + 2 * padding;
    let mut bitmap = GrayImage::from_pixel(out_w, out_h, Luma([PAPER]));
    for dy in 0..bbox.h {
        for dx in 0..bbox.w {
            let sx = bbox.x + dx;
            let sy = bbox.y + dy;
            let is_ink = !mask_in_bounds || source.ink_mask.get_pixel(sx, sy)[0] != 0;
            if is_ink {
                let tone = source.gray.get_pixel(sx, sy)[0];
                bitmap.put_pixel(padding + dx, padding + dy, Luma([tone]));
            }
        }
    }
    Some(Glyph::new(bitmap))
}

/// Build a fresh bank pairing `order` with `chars` one-to-one.
///
/// Only the first `min(order.len(), chars.count())` pairs are assigned; the
/// rest are silently left out. A repeated character keeps the glyph of its
/// last occurrence.
pub fn build_glyph_bank(
    source: &GlyphSource<'_>,
    order: &ReadingOrder,
    chars: &str,
    padding: u32,
) -> GlyphBank {
    let by_index: HashMap<usize, &BoundingBox> =
        source.boxes.iter().map(|b| (b.source_index, b)).collect();

    let mut bank = GlyphBank::new();
    for (&source_index, ch) in order.indices().iter().zip(chars.chars()) {
        let Some(bbox) = by_index.get(&source_index) else {
            log::warn!("reading order references unknown box {}", source_index);
            continue;
        };
        match crop_glyph(source, bbox, padding) {
            Some(glyph) => {
                bank.insert(ch, glyph);
            }
            None => log::warn!(
                "box {} lies outside the source image; '{}' left unassigned",
                source_index,
                ch
            ),
        }
    }
    bank
}

/// Glyph bank behind a single read/replace lock.
///
/// Readers take an `Arc` snapshot and lay out against it without holding the
/// lock; extraction swaps the whole bank in one step.
#[derive(Debug, Default)]
pub struct SharedGlyphBank {
    inner: RwLock<Arc<GlyphBank>>,
}

impl SharedGlyphBank {
    pub fn new(bank: GlyphBank) -> Self {
        Self {
            inner: RwLock::new(Arc::new(bank)),
        }
    }

    /// Current bank snapshot.
    pub fn snapshot(&self) -> Arc<GlyphBank> {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the bank wholesale. Returns the previous bank.
    pub fn replace(&self, bank: GlyphBank) -> Arc<GlyphBank> {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        core::mem::replace(&mut *guard, Arc::new(bank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading_order::resolve;

    fn sheet() -> (GrayImage, GrayImage, Vec<BoundingBox>) {
        // Two 4x6 ink blobs on one row at tone 40.
        let mut gray = GrayImage::from_pixel(40, 20, Luma([230]));
        let mut mask = GrayImage::new(40, 20);
        for (x0, tone) in [(5u32, 40u8), (20, 60)] {
            for y in 5..11 {
                for x in x0..x0 + 4 {
                    gray.put_pixel(x, y, Luma([tone]));
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        let boxes = vec![
            BoundingBox::new(20, 5, 4, 6, 0),
            BoundingBox::new(5, 5, 4, 6, 1),
        ];
        (gray, mask, boxes)
    }

    #[test]
    fn glyphs_are_padded_with_dark_ink_on_paper() {
        let (gray, mask, boxes) = sheet();
        let source = GlyphSource {
            gray: &gray,
            ink_mask: &mask,
            boxes: &boxes,
        };
        let glyph = crop_glyph(&source, &boxes[1], 3).expect("inside");
        assert_eq!((glyph.width(), glyph.height()), (10, 12));
        assert_eq!(glyph.bitmap().get_pixel(0, 0)[0], PAPER);
        assert_eq!(glyph.bitmap().get_pixel(3, 3)[0], 40);
        assert_eq!(glyph.bitmap().get_pixel(6, 8)[0], 40);
    }

    #[test]
    fn bank_pairs_reading_order_with_characters() {
        let (gray, mask, boxes) = sheet();
        let source = GlyphSource {
            gray: &gray,
            ink_mask: &mask,
            boxes: &boxes,
        };
        let order = resolve(&boxes, 10.0);
        let bank = build_glyph_bank(&source, &order, "ab", 0);
        // Box 1 is leftmost, so it becomes 'a'.
        assert_eq!(bank.get('a').map(|g| g.bitmap().get_pixel(0, 0)[0]), Some(40));
        assert_eq!(bank.get('b').map(|g| g.bitmap().get_pixel(0, 0)[0]), Some(60));
    }

    #[test]
    fn bank_size_is_bounded_by_shorter_input() {
        let (gray, mask, boxes) = sheet();
        let source = GlyphSource {
            gray: &gray,
            ink_mask: &mask,
            boxes: &boxes,
        };
        let order = resolve(&boxes, 10.0);
        assert_eq!(build_glyph_bank(&source, &order, "xyz", 2).len(), 2);
        assert_eq!(build_glyph_bank(&source, &order, "q", 2).len(), 1);
        let bank = build_glyph_bank(&source, &order, "q", 2);
        assert!(!bank.contains('x'));
    }

    #[test]
    fn empty_order_produces_empty_bank() {
        let (gray, mask, _) = sheet();
        let source = GlyphSource {
            gray: &gray,
            ink_mask: &mask,
            boxes: &[],
        };
        let bank = build_glyph_bank(&source, &ReadingOrder::default(), "abc", 4);
        assert!(bank.is_empty());
    }

    #[test]
    fn shared_bank_replaces_wholesale() {
        let mut first = GlyphBank::new();
        first.insert('a', Glyph::new(GrayImage::new(2, 2)));
        first.insert('b', Glyph::new(GrayImage::new(2, 2)));
        let shared = SharedGlyphBank::new(first);
        let before = shared.snapshot();

        let mut second = GlyphBank::new();
        second.insert('c', Glyph::new(GrayImage::new(3, 3)));
        shared.replace(second);

        let after = shared.snapshot();
        assert_eq!(before.len(), 2);
        assert_eq!(after.characters(), vec!['c']);
        assert!(!after.contains('a'));
    }
}
