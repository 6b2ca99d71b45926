//! Binarization and region detection for handwriting sheets.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;

use crate::error::DetectorError;
use crate::geometry::Region;

/// Mask value marking ink.
pub const INK: u8 = 255;

/// Finds connected ink regions in a binary mask.
///
/// The returned order is the detector's own; extraction records each
/// region's position in it as the box `source_index`.
pub trait RegionDetector {
    fn detect_regions(&self, ink_mask: &GrayImage) -> Result<Vec<Region>, DetectorError>;
}

impl<T: RegionDetector + ?Sized> RegionDetector for &T {
    fn detect_regions(&self, ink_mask: &GrayImage) -> Result<Vec<Region>, DetectorError> {
        (**self).detect_regions(ink_mask)
    }
}

/// Binarize a scan into an ink mask (ink = [`INK`], paper = 0).
///
/// Uses an Otsu global threshold with inverted polarity, then a square
/// morphological opening of `open_radius` to drop speckle. A radius of 1
/// is a 3×3 kernel; 0 skips the opening.
pub fn binarize(gray: &GrayImage, open_radius: u8) -> GrayImage {
    let (lo, hi) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if lo >= hi {
        // Flat scan: nothing separates ink from paper.
        return GrayImage::new(gray.width(), gray.height());
    }
    let level = imageproc::contrast::otsu_level(gray);
    let mask = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] <= level {
            Luma([INK])
        } else {
            Luma([0])
        }
    });
    log::debug!("binarized {}x{} scan at otsu level {}", gray.width(), gray.height(), level);
    if open_radius == 0 {
        return mask;
    }
    open(&mask, Norm::LInf, open_radius)
}

/// Contour-based detector reporting bounding boxes of external contours.
///
/// Holes inside glyphs (the bowl of an `o`, for instance) and blobs nested
/// inside holes are not reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContourDetector;

impl RegionDetector for ContourDetector {
    fn detect_regions(&self, ink_mask: &GrayImage) -> Result<Vec<Region>, DetectorError> {
        if ink_mask.width() == 0 || ink_mask.height() == 0 {
            return Ok(Vec::new());
        }
        let contours = find_contours::<u32>(ink_mask);
        let mut regions = Vec::new();
        for contour in contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        {
            let mut points = contour.points.iter();
            let Some(first) = points.next() else {
                continue;
            };
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
            for p in points {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            regions.push(Region::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1));
        }
        Ok(regions)
    }
}
