use core::convert::Infallible;

use embedded_graphics::{
    pixelcolor::{Gray8, GrayColor},
    prelude::*,
};
use image::{GrayImage, Luma};

/// Paper-white grayscale canvas backed by an `image::GrayImage`.
///
/// Drawing darkens: each pixel keeps the minimum of its current value and the
/// incoming color, so overlapping glyphs never erase each other's ink.
/// [`DrawTarget::clear`] overwrites unconditionally.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayCanvas {
    image: GrayImage,
}

impl GrayCanvas {
    /// White canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([Gray8::WHITE.luma()])),
        }
    }

    /// Canvas that draws on top of an existing raster.
    pub fn from_image(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }
}

impl OriginDimensions for GrayCanvas {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for GrayCanvas {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= width || y >= height {
                continue;
            }
            let dst = self.image.get_pixel_mut(x, y);
            dst[0] = dst[0].min(color.luma());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for px in self.image.pixels_mut() {
            px[0] = color.luma();
        }
        Ok(())
    }
}
