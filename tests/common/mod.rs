#![allow(dead_code)]

pub mod budget_alloc;

use image::{GrayImage, Luma};
use scrawl::{Glyph, GlyphBank};

pub const PANGRAM: &str = "the quick brown fox jumps over the lazy dog";

/// Solid glyphs for `a..=z` with a few distinct widths and heights.
pub fn lowercase_bank() -> GlyphBank {
    let mut bank = GlyphBank::new();
    for (i, ch) in ('a'..='z').enumerate() {
        let w = 12 + (i as u32 % 4) * 3;
        let h = 24 + (i as u32 % 3) * 4;
        bank.insert(ch, Glyph::new(GrayImage::from_pixel(w, h, Luma([40]))));
    }
    bank
}

/// Paint a dark rectangle onto a light sheet.
pub fn ink_block(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, Luma([20]));
        }
    }
}
