use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::{Gray8, GrayColor},
    prelude::*,
    primitives::{PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
    text::{Baseline, Text},
};
use image::GrayImage;
use scrawl::{BoundingBox, ReadingOrder};

use crate::canvas::GrayCanvas;

/// Outline stroke for debug boxes.
const OVERLAY_STROKE: u32 = 2;

/// Copy of `source` with every ordered box outlined and labeled with its
/// 0-based reading-order rank.
pub fn draw_reading_order_overlay(
    source: &GrayImage,
    boxes: &[BoundingBox],
    order: &ReadingOrder,
) -> GrayImage {
    let mut canvas = GrayCanvas::from_image(source.clone());
    let outline = PrimitiveStyleBuilder::new()
        .stroke_color(Gray8::BLACK)
        .stroke_width(OVERLAY_STROKE)
        .stroke_alignment(StrokeAlignment::Inside)
        .build();
    let label = MonoTextStyle::new(&FONT_6X10, Gray8::BLACK);

    for (rank, source_index) in order.indices().iter().enumerate() {
        let Some(bbox) = boxes.iter().find(|b| b.source_index == *source_index) else {
            continue;
        };
        let origin = Point::new(bbox.x as i32, bbox.y as i32);
        // Infallible target.
        let _ = Rectangle::new(origin, Size::new(bbox.w, bbox.h))
            .into_styled(outline)
            .draw(&mut canvas);
        let _ = Text::with_baseline(
            &rank.to_string(),
            origin - Point::new(0, 2),
            label,
            Baseline::Bottom,
        )
        .draw(&mut canvas);
    }
    log::debug!("drew reading-order overlay for {} boxes", order.len());
    canvas.into_image()
}
