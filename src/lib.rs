//! # scrawl
//!
//! Turns a scanned sheet of handwritten characters into a reusable glyph bank.
//!
//! The pipeline binarizes the scan, detects one region per glyph, resolves the
//! regions into reading order (rows top to bottom, left to right within a row)
//! and pairs them with a caller-supplied character sequence.
//!
//! Layout and rasterization live in the companion crates `scrawl-render`
//! (flow and paginated layout into a backend-agnostic page IR),
//! `scrawl-embedded-graphics` (raster backend) and `scrawl-pdf` (document
//! encoder).
//!
//! ```no_run
//! use scrawl::{ExtractOptions, GlyphExtractor};
//!
//! let scan = image::open("sheet.png")?;
//! let extraction = GlyphExtractor::new(ExtractOptions::default())
//!     .extract(&scan, "abcdefghijklmnopqrstuvwxyz")?;
//! println!("{}", extraction.status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod detect;
pub mod document;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod glyph_bank;
pub mod glyph_io;
pub mod reading_order;

pub use detect::{binarize, ContourDetector, RegionDetector, INK};
pub use document::{DocumentEncoder, PageSize, ParsePageSizeError};
pub use error::{DetectorError, ExtractError, ExtractStatus, GlyphIoError};
pub use extract::{filter_min_area, ExtractOptions, Extraction, GlyphExtractor};
pub use geometry::{BoundingBox, Region};
pub use glyph_bank::{
    build_glyph_bank, crop_glyph, Glyph, GlyphBank, GlyphSource, SharedGlyphBank, PAPER,
};
pub use glyph_io::{char_for_file_stem, file_stem_for, load_glyph_bank, save_glyph_bank};
pub use reading_order::{resolve, ReadingOrder, Row};
