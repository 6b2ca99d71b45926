//! End-to-end glyph extraction: scan → mask → regions → reading order → bank.

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use crate::detect::{binarize, ContourDetector, RegionDetector};
use crate::error::{ExtractError, ExtractStatus};
use crate::geometry::{BoundingBox, Region};
use crate::glyph_bank::{build_glyph_bank, GlyphBank, GlyphSource};
use crate::reading_order::{resolve, ReadingOrder};

/// Extraction options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Regions with `w·h` below this are discarded before ordering.
    pub min_area: u64,
    /// Max vertical distance between a box center and a row anchor.
    pub row_gap_threshold: f32,
    /// Paper border added around each glyph.
    pub padding: u32,
    /// Morphological opening radius applied to the ink mask (0 disables).
    pub open_radius: u8,
    /// Drop whitespace from the character sequence before pairing.
    pub skip_whitespace: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_area: 140,
            row_gap_threshold: 30.0,
            padding: 10,
            open_radius: 1,
            skip_whitespace: true,
        }
    }
}

/// Result of one extraction pass.
#[derive(Clone, Debug)]
pub struct Extraction {
    /// Freshly built bank; replaces any previous one.
    pub bank: GlyphBank,
    /// Boxes that survived the area filter, in detector order.
    pub boxes: Vec<BoundingBox>,
    pub order: ReadingOrder,
    pub status: ExtractStatus,
}

/// Keep regions with `w·h >= min_area`, tagging each with its detector index.
pub fn filter_min_area(regions: &[Region], min_area: u64) -> Vec<BoundingBox> {
    regions
        .iter()
        .enumerate()
        .filter(|(_, region)| region.area() >= min_area)
        .map(|(idx, region)| BoundingBox::from_region(*region, idx))
        .collect()
}

/// Glyph extraction pipeline with a pluggable region detector.
#[derive(Clone, Debug)]
pub struct GlyphExtractor<D = ContourDetector> {
    options: ExtractOptions,
    detector: D,
}

impl GlyphExtractor<ContourDetector> {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            detector: ContourDetector,
        }
    }
}

impl Default for GlyphExtractor<ContourDetector> {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl<D: RegionDetector> GlyphExtractor<D> {
    pub fn with_detector(options: ExtractOptions, detector: D) -> Self {
        Self { options, detector }
    }

    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    /// Extract glyphs from a color or grayscale scan.
    pub fn extract(&self, image: &DynamicImage, chars: &str) -> Result<Extraction, ExtractError> {
        self.extract_gray(&image.to_luma8(), chars)
    }

    /// Extract glyphs from a grayscale scan with dark ink on light paper.
    pub fn extract_gray(&self, gray: &GrayImage, chars: &str) -> Result<Extraction, ExtractError> {
        let chars: String = if self.options.skip_whitespace {
            chars.chars().filter(|c| !c.is_whitespace()).collect()
        } else {
            chars.to_string()
        };
        if chars.is_empty() {
            return Err(ExtractError::EmptyCharacterSequence);
        }
        if gray.width() == 0 || gray.height() == 0 {
            return Err(ExtractError::EmptyImage);
        }

        let ink_mask = binarize(gray, self.options.open_radius);
        let regions = self.detector.detect_regions(&ink_mask)?;
        let boxes = filter_min_area(&regions, self.options.min_area);
        log::debug!(
            "detected {} regions, {} kept at min_area={}",
            regions.len(),
            boxes.len(),
            self.options.min_area
        );

        let order = resolve(&boxes, self.options.row_gap_threshold);
        let source = GlyphSource {
            gray,
            ink_mask: &ink_mask,
            boxes: &boxes,
        };
        let bank = build_glyph_bank(&source, &order, &chars, self.options.padding);

        let requested = chars.chars().count();
        let status = if order.is_empty() {
            ExtractStatus::NoInputRegions
        } else if order.len() < requested {
            log::warn!(
                "found {} glyph regions for {} characters",
                order.len(),
                requested
            );
            ExtractStatus::Partial {
                found: order.len(),
                requested,
            }
        } else {
            ExtractStatus::Complete { glyphs: bank.len() }
        };
        log::info!("{}", status);

        Ok(Extraction {
            bank,
            boxes,
            order,
            status,
        })
    }
}
