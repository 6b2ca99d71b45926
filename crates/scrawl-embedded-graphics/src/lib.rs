//! embedded-graphics raster backend for `scrawl-render` pages.

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

mod canvas;
mod overlay;
mod texture;

use std::borrow::Cow;

use embedded_graphics::{
    pixelcolor::{Gray8, GrayColor},
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use scrawl::{GlyphBank, PAPER};
use scrawl_render::{
    CancelToken, DrawCommand, FlowConfig, FlowEngine, GlyphCommand, JitterSource, LayoutConfig,
    LayoutDiagnostics, LayoutEngine, PlaceholderCommand, RenderPage,
};
use serde::{Deserialize, Serialize};

pub use canvas::GrayCanvas;
pub use overlay::draw_reading_order_overlay;
pub use texture::{apply_paper_texture, DEFAULT_TEXTURE_STRENGTH};

/// Outline tone for missing-glyph boxes.
const PLACEHOLDER_TONE: u8 = 160;

/// How placeholders for missing glyphs are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingGlyphPolicy {
    /// Leave the placeholder area blank.
    #[default]
    Blank,
    /// Draw a 1px outline of the placeholder box.
    Outline,
}

/// Raster backend options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EgRenderConfig {
    /// Clear the target to white before drawing.
    pub clear_first: bool,
    pub missing_glyph: MissingGlyphPolicy,
}

impl Default for EgRenderConfig {
    fn default() -> Self {
        Self {
            clear_first: true,
            missing_glyph: MissingGlyphPolicy::Blank,
        }
    }
}

/// Paper added around a glyph while it is rotated.
const ROTATION_BORDER: u32 = 2;

/// Draws IR pages onto grayscale targets using glyphs from a bank.
#[derive(Clone, Copy, Debug)]
pub struct GlyphRenderer<'a> {
    cfg: EgRenderConfig,
    bank: &'a GlyphBank,
}

impl<'a> GlyphRenderer<'a> {
    pub fn new(bank: &'a GlyphBank, cfg: EgRenderConfig) -> Self {
        Self { cfg, bank }
    }

    pub fn config(&self) -> EgRenderConfig {
        self.cfg
    }

    /// Render page commands to a display.
    pub fn render_page<D>(&self, page: &RenderPage, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray8>,
    {
        if self.cfg.clear_first {
            display.clear(Gray8::WHITE)?;
        }
        for cmd in &page.commands {
            self.draw_command(display, cmd)?;
        }
        Ok(())
    }

    /// Render a page onto a fresh white raster of the page's size.
    pub fn rasterize(&self, page: &RenderPage) -> GrayImage {
        let mut canvas = GrayCanvas::new(page.width, page.height);
        match self.render_page(page, &mut canvas) {
            Ok(()) => canvas.into_image(),
            Err(never) => match never {},
        }
    }

    fn draw_command<D>(&self, display: &mut D, cmd: &DrawCommand) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray8>,
    {
        match cmd {
            DrawCommand::Glyph(glyph) => self.draw_glyph(display, glyph),
            DrawCommand::MissingGlyph(placeholder) => self.draw_placeholder(display, placeholder),
        }
    }

    fn draw_glyph<D>(&self, display: &mut D, cmd: &GlyphCommand) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray8>,
    {
        if cmd.width == 0 || cmd.height == 0 {
            return Ok(());
        }
        let Some(glyph) = self.bank.get(cmd.ch) else {
            log::warn!("glyph {:?} vanished from the bank after layout", cmd.ch);
            return Ok(());
        };
        let bitmap = fit_glyph(glyph.bitmap(), cmd.width, cmd.height, cmd.rotation_deg);
        let (x0, y0) = (cmd.x, cmd.y);
        display.draw_iter(
            bitmap
                .enumerate_pixels()
                .filter(|(_, _, px)| px[0] < PAPER)
                .map(|(dx, dy, px)| {
                    Pixel(Point::new(x0 + dx as i32, y0 + dy as i32), Gray8::new(px[0]))
                }),
        )
    }

    fn draw_placeholder<D>(&self, display: &mut D, cmd: &PlaceholderCommand) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray8>,
    {
        match self.cfg.missing_glyph {
            MissingGlyphPolicy::Blank => Ok(()),
            MissingGlyphPolicy::Outline => Rectangle::new(
                Point::new(cmd.x, cmd.y),
                Size::new(cmd.width, cmd.height),
            )
            .into_styled(PrimitiveStyle::with_stroke(Gray8::new(PLACEHOLDER_TONE), 1))
            .draw(display),
        }
    }
}

/// Scale a glyph into its box, then rotate it about the center.
///
/// Rotation keeps the box size; corners that fall outside are clipped and
/// uncovered area is filled with paper.
fn fit_glyph(bitmap: &GrayImage, width: u32, height: u32, rotation_deg: f32) -> Cow<'_, GrayImage> {
    let scaled = if bitmap.dimensions() == (width, height) {
        Cow::Borrowed(bitmap)
    } else {
        Cow::Owned(imageops::resize(bitmap, width, height, FilterType::Triangle))
    };
    if rotation_deg == 0.0 || !rotation_deg.is_finite() {
        return scaled;
    }
    // Bilinear sampling drops the outermost source pixels, so rotate on a
    // paper border and cut the original box back out.
    let mut padded = GrayImage::from_pixel(
        width + 2 * ROTATION_BORDER,
        height + 2 * ROTATION_BORDER,
        Luma([PAPER]),
    );
    imageops::replace(
        &mut padded,
        &*scaled,
        i64::from(ROTATION_BORDER),
        i64::from(ROTATION_BORDER),
    );
    let rotated = rotate_about_center(
        &padded,
        rotation_deg.to_radians(),
        Interpolation::Bilinear,
        Luma([PAPER]),
    );
    let boxed = imageops::crop_imm(&rotated, ROTATION_BORDER, ROTATION_BORDER, width, height);
    Cow::Owned(boxed.to_image())
}

/// Rasterized flow layout.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFlow {
    pub image: GrayImage,
    pub diagnostics: LayoutDiagnostics,
}

/// Rasterized paginated layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedPages {
    pub pages: Vec<GrayImage>,
    pub diagnostics: LayoutDiagnostics,
    pub truncated: bool,
    pub cancelled: bool,
}

/// Lay out `text` on one canvas and rasterize it.
pub fn render_flow<J>(
    text: &str,
    bank: &GlyphBank,
    cfg: FlowConfig,
    render_cfg: EgRenderConfig,
    jitter: &mut J,
) -> RenderedFlow
where
    J: JitterSource + ?Sized,
{
    let layout = FlowEngine::new(cfg).layout(text, bank, jitter);
    let image = GlyphRenderer::new(bank, render_cfg).rasterize(&layout.page);
    RenderedFlow {
        image,
        diagnostics: layout.diagnostics,
    }
}

/// Lay out `text` onto fixed-size pages and rasterize each page as it closes.
pub fn render_pages<J, C>(
    text: &str,
    bank: &GlyphBank,
    cfg: LayoutConfig,
    render_cfg: EgRenderConfig,
    jitter: &mut J,
    cancel: &C,
) -> RenderedPages
where
    J: JitterSource + ?Sized,
    C: CancelToken + ?Sized,
{
    let renderer = GlyphRenderer::new(bank, render_cfg);
    let mut pages = Vec::with_capacity(2);
    let summary = LayoutEngine::new(cfg).layout_with(text, bank, jitter, cancel, |page| {
        pages.push(renderer.rasterize(&page));
    });
    RenderedPages {
        pages,
        diagnostics: summary.diagnostics,
        truncated: summary.truncated,
        cancelled: summary.cancelled,
    }
}
