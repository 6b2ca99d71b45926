use scrawl::{GlyphBank, PageSize};
use serde::{Deserialize, Serialize};

use crate::jitter::JitterSource;
use crate::render_ir::{
    DrawCommand, GlyphCommand, LayoutDiagnostics, PlaceholderCommand, RenderPage,
};

/// Unscaled height of a nominal glyph cell. Spaces and line-end checks use it.
pub const NOMINAL_CELL_PX: f32 = 40.0;
/// Unscaled placeholder box for characters missing from the bank.
pub const PLACEHOLDER_PX: (f32, f32) = (22.0, 38.0);
/// Narrowest space the flow engine draws. Paginated layout has no floor.
pub const FLOW_MIN_SPACE_PX: u32 = 4;

/// Glyph size lookup used while measuring text.
pub trait GlyphMetrics {
    /// Unscaled glyph size, or `None` when the character has no glyph.
    fn glyph_size(&self, ch: char) -> Option<(u32, u32)>;
}

impl GlyphMetrics for GlyphBank {
    fn glyph_size(&self, ch: char) -> Option<(u32, u32)> {
        self.get(ch).map(|glyph| (glyph.width(), glyph.height()))
    }
}

impl<T: GlyphMetrics + ?Sized> GlyphMetrics for &T {
    fn glyph_size(&self, ch: char) -> Option<(u32, u32)> {
        (**self).glyph_size(ch)
    }
}

/// Cancellation hook for long-running layout operations.
///
/// Checked at page boundaries only.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// Never-cancel token for default call paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// What a measured item draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Glyph(char),
    Space,
    Missing(char),
}

/// One measured character, scaled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutItem {
    pub kind: ItemKind,
    pub width: u32,
    pub height: u32,
}

fn scaled(px: f32, scale: f32) -> u32 {
    // Absorb f32 representation error (40 × 0.45 and friends) before flooring.
    (px * scale + 1e-4).floor().max(0.0) as u32
}

/// Settings shared by both engines.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ItemStyle {
    scale: f32,
    letter_spacing: i32,
    space_factor: f32,
    vertical_jitter: i32,
    rotation_deg: f32,
}

impl ItemStyle {
    fn space(self) -> LayoutItem {
        LayoutItem {
            kind: ItemKind::Space,
            width: scaled(NOMINAL_CELL_PX * self.space_factor, self.scale),
            height: scaled(NOMINAL_CELL_PX, self.scale),
        }
    }

    fn flow_space(self) -> LayoutItem {
        let space = self.space();
        LayoutItem {
            width: space.width.max(FLOW_MIN_SPACE_PX),
            ..space
        }
    }

    fn measure<M: GlyphMetrics + ?Sized>(self, ch: char, metrics: &M) -> LayoutItem {
        match metrics.glyph_size(ch) {
            Some((w, h)) => LayoutItem {
                kind: ItemKind::Glyph(ch),
                width: scaled(w as f32, self.scale),
                height: scaled(h as f32, self.scale),
            },
            None => LayoutItem {
                kind: ItemKind::Missing(ch),
                width: scaled(PLACEHOLDER_PX.0, self.scale),
                height: scaled(PLACEHOLDER_PX.1, self.scale),
            },
        }
    }

    /// Horizontal advance of one item.
    fn advance(self, item: &LayoutItem) -> i32 {
        item.width as i32 + self.letter_spacing
    }

    fn place<J: JitterSource + ?Sized>(
        self,
        page: &mut RenderPage,
        item: &LayoutItem,
        x: i32,
        y: i32,
        jitter: &mut J,
        diagnostics: &mut LayoutDiagnostics,
    ) {
        match item.kind {
            ItemKind::Space => {}
            ItemKind::Glyph(ch) => {
                let dy = jitter.offset(self.vertical_jitter);
                let rotation_deg = jitter.angle(self.rotation_deg);
                page.push(DrawCommand::Glyph(GlyphCommand {
                    ch,
                    x,
                    y: y + dy,
                    width: item.width,
                    height: item.height,
                    rotation_deg,
                }));
            }
            ItemKind::Missing(ch) => {
                let dy = jitter.offset(self.vertical_jitter);
                diagnostics.record_missing(ch);
                page.push(DrawCommand::MissingGlyph(PlaceholderCommand {
                    ch,
                    x,
                    y: y + dy,
                    width: item.width,
                    height: item.height,
                }));
            }
        }
    }
}

/// Measure one character the way the flow engine does (`' '` is a space).
pub fn measure_item<M: GlyphMetrics + ?Sized>(
    ch: char,
    metrics: &M,
    scale: f32,
    space_factor: f32,
) -> LayoutItem {
    let style = ItemStyle {
        scale,
        letter_spacing: 0,
        space_factor,
        vertical_jitter: 0,
        rotation_deg: 0.0,
    };
    if ch == ' ' {
        style.flow_space()
    } else {
        style.measure(ch, metrics)
    }
}

/// Flow layout configuration: one canvas sized to fit the text.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Glyph scale factor.
    pub scale: f32,
    /// Extra advance after every item.
    pub letter_spacing: i32,
    /// Space width as a fraction of the nominal cell.
    pub space_factor: f32,
    /// Extra gap between lines.
    pub line_spacing: i32,
    /// Max vertical offset per draw.
    pub vertical_jitter: i32,
    /// Max rotation per glyph, in degrees.
    pub rotation_deg: f32,
    /// Canvas margin on every side.
    pub margin: i32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            letter_spacing: 4,
            space_factor: 0.45,
            line_spacing: 22,
            vertical_jitter: 3,
            rotation_deg: 0.0,
            margin: 20,
        }
    }
}

impl FlowConfig {
    fn item_style(self) -> ItemStyle {
        ItemStyle {
            scale: self.scale,
            letter_spacing: self.letter_spacing,
            space_factor: self.space_factor,
            vertical_jitter: self.vertical_jitter,
            rotation_deg: self.rotation_deg,
        }
    }
}

/// Paginated layout configuration for fixed-size pages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Physical page size.
    pub page_size: PageSize,
    /// Margin on every side.
    pub margin: i32,
    /// Glyph scale factor.
    pub scale: f32,
    /// Extra advance after every item.
    pub letter_spacing: i32,
    /// Space width as a fraction of the nominal cell.
    pub space_factor: f32,
    /// Extra gap between lines.
    pub line_spacing: i32,
    /// Max vertical offset per draw.
    pub vertical_jitter: i32,
    /// Max rotation per glyph, in degrees.
    pub rotation_deg: f32,
    /// Stop after this many pages. `Some(0)` behaves like `Some(1)`.
    pub max_pages: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: 50,
            scale: 1.0,
            letter_spacing: 4,
            space_factor: 0.45,
            line_spacing: 26,
            vertical_jitter: 2,
            rotation_deg: 0.0,
            max_pages: None,
        }
    }
}

impl LayoutConfig {
    /// Convenience for a page size with the default typography.
    pub fn for_page(page_size: PageSize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    fn item_style(self) -> ItemStyle {
        ItemStyle {
            scale: self.scale,
            letter_spacing: self.letter_spacing,
            space_factor: self.space_factor,
            vertical_jitter: self.vertical_jitter,
            rotation_deg: self.rotation_deg,
        }
    }

    /// `margin + usable width`.
    fn content_right(self) -> i32 {
        self.page_size.width() as i32 - self.margin
    }

    /// `margin + usable height`.
    fn content_bottom(self) -> i32 {
        self.page_size.height() as i32 - self.margin
    }
}

/// Flow layout result.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowLayout {
    pub page: RenderPage,
    pub diagnostics: LayoutDiagnostics,
}

/// Summary emitted after paginated layout completes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutSummary {
    /// Pages handed to the callback.
    pub page_count: usize,
    pub diagnostics: LayoutDiagnostics,
    /// Layout stopped at `max_pages` before the final page.
    pub truncated: bool,
    /// Layout stopped because the cancel token fired.
    pub cancelled: bool,
}

/// Collected paginated layout result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageLayout {
    pub pages: Vec<RenderPage>,
    pub diagnostics: LayoutDiagnostics,
    pub truncated: bool,
    pub cancelled: bool,
}

/// Single-canvas layout engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowEngine {
    cfg: FlowConfig,
}

impl FlowEngine {
    pub fn new(cfg: FlowConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> FlowConfig {
        self.cfg
    }

    /// Lay out `text` on one canvas. Lines split on `'\n'` only and never wrap.
    pub fn layout<M, J>(&self, text: &str, metrics: &M, jitter: &mut J) -> FlowLayout
    where
        M: GlyphMetrics + ?Sized,
        J: JitterSource + ?Sized,
    {
        let cfg = self.cfg;
        let style = cfg.item_style();
        let lines: Vec<(Vec<LayoutItem>, i32)> = text
            .split('\n')
            .map(|line| {
                let items: Vec<LayoutItem> = line
                    .chars()
                    .map(|ch| {
                        if ch == ' ' {
                            style.flow_space()
                        } else {
                            style.measure(ch, metrics)
                        }
                    })
                    .collect();
                let line_height = items.iter().map(|item| item.height).max().unwrap_or(0);
                (items, line_height as i32)
            })
            .collect();

        let max_line_width = lines
            .iter()
            .map(|(items, _)| items.iter().map(|item| style.advance(item)).sum::<i32>())
            .max()
            .unwrap_or(0);
        let stacked_height: i32 = lines
            .iter()
            .map(|(_, line_height)| line_height + cfg.line_spacing)
            .sum();
        let width = (max_line_width + 2 * cfg.margin).max(0) as u32;
        let height = (cfg.margin + stacked_height + cfg.margin).max(0) as u32;

        let mut page = RenderPage::new(1, width, height);
        let mut diagnostics = LayoutDiagnostics::default();
        let mut y = cfg.margin;
        for (items, line_height) in &lines {
            let mut x = cfg.margin;
            for item in items {
                style.place(&mut page, item, x, y, jitter, &mut diagnostics);
                x += style.advance(item);
            }
            y += line_height + cfg.line_spacing;
            diagnostics.lines_committed += 1;
        }
        diagnostics.pages_emitted = 1;
        log::debug!(
            "flow layout: {} lines on a {}x{} canvas, {} missing glyphs",
            lines.len(),
            width,
            height,
            diagnostics.missing_glyphs
        );
        FlowLayout { page, diagnostics }
    }
}

/// Lay out `text` on one canvas sized to fit it.
pub fn layout_flow<M, J>(text: &str, metrics: &M, cfg: FlowConfig, jitter: &mut J) -> FlowLayout
where
    M: GlyphMetrics + ?Sized,
    J: JitterSource + ?Sized,
{
    FlowEngine::new(cfg).layout(text, metrics, jitter)
}

/// Deterministic (given the jitter source) paginated layout engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutEngine {
    cfg: LayoutConfig,
}

/// Why a paginated run stopped early.
enum Halt {
    PageLimit,
    Cancelled,
}

/// Cursor over the page being filled.
struct PageCursor<F> {
    cfg: LayoutConfig,
    x: i32,
    y: i32,
    line_height: i32,
    page: RenderPage,
    on_page: F,
    diagnostics: LayoutDiagnostics,
}

impl<F: FnMut(RenderPage)> PageCursor<F> {
    fn new(cfg: LayoutConfig, on_page: F) -> Self {
        let (width, height) = cfg.page_size.dimensions();
        Self {
            cfg,
            x: cfg.margin,
            y: cfg.margin,
            line_height: 0,
            page: RenderPage::new(1, width, height),
            on_page,
            diagnostics: LayoutDiagnostics::default(),
        }
    }

    fn at_line_start(&self) -> bool {
        self.x == self.cfg.margin
    }

    fn grow_line(&mut self, height: u32) {
        self.line_height = self.line_height.max(height as i32);
    }

    fn commit_line(&mut self) {
        self.y += self.line_height + self.cfg.line_spacing;
        self.x = self.cfg.margin;
        self.line_height = 0;
        self.diagnostics.lines_committed += 1;
    }

    fn emit_page(&mut self) {
        let (width, height) = self.cfg.page_size.dimensions();
        let next = RenderPage::new(self.page.page_number + 1, width, height);
        let page = core::mem::replace(&mut self.page, next);
        self.diagnostics.pages_emitted += 1;
        (self.on_page)(page);
    }

    fn new_page<C: CancelToken + ?Sized>(&mut self, cancel: &C) -> Result<(), Halt> {
        self.emit_page();
        self.x = self.cfg.margin;
        self.y = self.cfg.margin;
        self.line_height = 0;
        if let Some(limit) = self.cfg.max_pages {
            if self.diagnostics.pages_emitted >= limit.max(1) {
                return Err(Halt::PageLimit);
            }
        }
        if cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }
        Ok(())
    }

    /// Commit the line, then start a page if `next_height` no longer fits.
    fn wrap<C: CancelToken + ?Sized>(&mut self, next_height: u32, cancel: &C) -> Result<(), Halt> {
        self.commit_line();
        if self.y + next_height as i32 > self.cfg.content_bottom() {
            self.new_page(cancel)?;
        }
        Ok(())
    }
}

impl LayoutEngine {
    pub fn new(cfg: LayoutConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> LayoutConfig {
        self.cfg
    }

    /// Lay out `text` into pages.
    pub fn layout_text<M, J>(&self, text: &str, metrics: &M, jitter: &mut J) -> PageLayout
    where
        M: GlyphMetrics + ?Sized,
        J: JitterSource + ?Sized,
    {
        self.layout_text_with_cancel(text, metrics, jitter, &NeverCancel)
    }

    /// Lay out `text` into pages, stopping early if `cancel` fires.
    pub fn layout_text_with_cancel<M, J, C>(
        &self,
        text: &str,
        metrics: &M,
        jitter: &mut J,
        cancel: &C,
    ) -> PageLayout
    where
        M: GlyphMetrics + ?Sized,
        J: JitterSource + ?Sized,
        C: CancelToken + ?Sized,
    {
        let mut pages = Vec::with_capacity(2);
        let summary = self.layout_with(text, metrics, jitter, cancel, |page| pages.push(page));
        PageLayout {
            pages,
            diagnostics: summary.diagnostics,
            truncated: summary.truncated,
            cancelled: summary.cancelled,
        }
    }

    /// Lay out `text` and stream each finished page.
    pub fn layout_with<M, J, C, F>(
        &self,
        text: &str,
        metrics: &M,
        jitter: &mut J,
        cancel: &C,
        on_page: F,
    ) -> LayoutSummary
    where
        M: GlyphMetrics + ?Sized,
        J: JitterSource + ?Sized,
        C: CancelToken + ?Sized,
        F: FnMut(RenderPage),
    {
        let mut cursor = PageCursor::new(self.cfg, on_page);
        let outcome = if cancel.is_cancelled() {
            Err(Halt::Cancelled)
        } else {
            self.run(&mut cursor, text, metrics, jitter, cancel)
        };

        let mut summary = LayoutSummary::default();
        match outcome {
            Ok(()) => cursor.emit_page(),
            Err(Halt::PageLimit) => {
                log::warn!(
                    "layout stopped at the {}-page limit",
                    cursor.diagnostics.pages_emitted
                );
                summary.truncated = true;
            }
            Err(Halt::Cancelled) => {
                log::debug!(
                    "layout cancelled after {} pages",
                    cursor.diagnostics.pages_emitted
                );
                summary.cancelled = true;
            }
        }
        summary.page_count = cursor.diagnostics.pages_emitted;
        summary.diagnostics = cursor.diagnostics;
        log::debug!(
            "paginated layout: {} pages, {} lines, {} missing glyphs",
            summary.page_count,
            summary.diagnostics.lines_committed,
            summary.diagnostics.missing_glyphs
        );
        summary
    }

    fn run<M, J, C, F>(
        &self,
        cursor: &mut PageCursor<F>,
        text: &str,
        metrics: &M,
        jitter: &mut J,
        cancel: &C,
    ) -> Result<(), Halt>
    where
        M: GlyphMetrics + ?Sized,
        J: JitterSource + ?Sized,
        C: CancelToken + ?Sized,
        F: FnMut(RenderPage),
    {
        let cfg = self.cfg;
        let style = cfg.item_style();
        let right = cfg.content_right();
        let space = style.space();
        // The end-of-line page check uses the unscaled cell.
        let line_end_height = NOMINAL_CELL_PX as u32;
        let mut word_items: Vec<LayoutItem> = Vec::with_capacity(16);

        for line in text.split('\n') {
            // Repeated spaces yield empty words, each adding one more space.
            let mut words = line.split(' ').peekable();
            while let Some(word) = words.next() {
                word_items.clear();
                word_items.extend(word.chars().map(|ch| style.measure(ch, metrics)));
                let word_width: i32 = word_items.iter().map(|item| style.advance(item)).sum();
                let word_height = word_items.iter().map(|item| item.height).max().unwrap_or(0);

                if cursor.x + word_width > right {
                    if !cursor.at_line_start() {
                        cursor.wrap(word_height, cancel)?;
                    }
                    if cursor.x + word_width > right {
                        log::warn!("word {:?} is wider than the page; it will overflow", word);
                        cursor.diagnostics.overwide_words += 1;
                    }
                }

                for item in &word_items {
                    style.place(
                        &mut cursor.page,
                        item,
                        cursor.x,
                        cursor.y,
                        jitter,
                        &mut cursor.diagnostics,
                    );
                    cursor.x += style.advance(item);
                    cursor.grow_line(item.height);
                }

                if words.peek().is_some() {
                    if cursor.x + space.width as i32 > right {
                        cursor.wrap(space.height, cancel)?;
                    } else {
                        cursor.x += style.advance(&space);
                        cursor.grow_line(space.height);
                    }
                }
            }
            cursor.wrap(line_end_height, cancel)?;
        }
        Ok(())
    }
}

/// Lay out `text` onto fixed-size pages.
pub fn layout_paginated<M, J>(
    text: &str,
    metrics: &M,
    cfg: LayoutConfig,
    jitter: &mut J,
) -> PageLayout
where
    M: GlyphMetrics + ?Sized,
    J: JitterSource + ?Sized,
{
    LayoutEngine::new(cfg).layout_text(text, metrics, jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{NoJitter, SeededJitter};
    use core::cell::Cell;
    use image::{GrayImage, Luma};
    use scrawl::Glyph;

    fn bank(entries: &[(char, u32, u32)]) -> GlyphBank {
        let mut bank = GlyphBank::new();
        for &(ch, w, h) in entries {
            bank.insert(ch, Glyph::new(GrayImage::from_pixel(w, h, Luma([0]))));
        }
        bank
    }

    fn glyph_positions(page: &RenderPage) -> Vec<(char, i32, i32)> {
        page.glyphs().map(|g| (g.ch, g.x, g.y)).collect()
    }

    fn page_cfg(width: u32, height: u32, margin: i32) -> LayoutConfig {
        LayoutConfig {
            page_size: PageSize::Custom { width, height },
            margin,
            letter_spacing: 0,
            vertical_jitter: 0,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn measure_follows_nominal_cells() {
        let bank = bank(&[('a', 10, 20)]);
        let space = measure_item(' ', &bank, 1.0, 0.45);
        assert_eq!((space.width, space.height), (18, 40));
        let missing = measure_item('?', &bank, 2.0, 0.45);
        assert_eq!(missing.kind, ItemKind::Missing('?'));
        assert_eq!((missing.width, missing.height), (44, 76));
        let glyph = measure_item('a', &bank, 0.5, 0.45);
        assert_eq!((glyph.width, glyph.height), (5, 10));
    }

    #[test]
    fn flow_space_has_a_floor_paginated_does_not() {
        let bank = bank(&[('a', 10, 20)]);
        assert_eq!(measure_item(' ', &bank, 0.2, 0.45).width, FLOW_MIN_SPACE_PX);

        let flow_cfg = FlowConfig {
            scale: 0.2,
            letter_spacing: 0,
            vertical_jitter: 0,
            ..FlowConfig::default()
        };
        let flow = layout_flow("a a", &bank, flow_cfg, &mut NoJitter);
        assert_eq!(
            glyph_positions(&flow.page),
            vec![('a', 20, 20), ('a', 26, 20)]
        );

        let page = LayoutConfig {
            scale: 0.2,
            ..page_cfg(200, 200, 10)
        };
        let paged = layout_paginated("a a", &bank, page, &mut NoJitter);
        assert_eq!(
            glyph_positions(&paged.pages[0]),
            vec![('a', 10, 10), ('a', 15, 10)]
        );
    }

    #[test]
    fn line_end_page_check_ignores_scale() {
        let bank = bank(&[('a', 20, 20)]);
        let cfg = LayoutConfig {
            scale: 0.5,
            line_spacing: 50,
            ..page_cfg(100, 100, 10)
        };
        // After the line, y = 10 + 10 + 50 = 70 and 70 + 40 passes the bottom edge at 90.
        let out = layout_paginated("a", &bank, cfg, &mut NoJitter);
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.pages[0].glyphs().count(), 1);
        assert!(out.pages[1].is_blank());

        let unscaled = LayoutConfig {
            scale: 1.0,
            line_spacing: 20,
            ..page_cfg(100, 100, 10)
        };
        // y = 10 + 20 + 20 = 50, 50 + 40 = 90 still fits.
        let out = layout_paginated("a", &bank, unscaled, &mut NoJitter);
        assert_eq!(out.pages.len(), 1);
    }

    #[test]
    fn flow_canvas_fits_lines() {
        let bank = bank(&[('a', 10, 20)]);
        let cfg = FlowConfig {
            vertical_jitter: 0,
            ..FlowConfig::default()
        };
        let out = layout_flow("aa\na", &bank, cfg, &mut NoJitter);
        assert_eq!((out.page.width, out.page.height), (68, 124));
        assert_eq!(
            glyph_positions(&out.page),
            vec![('a', 20, 20), ('a', 34, 20), ('a', 20, 62)]
        );
        assert_eq!(out.diagnostics.lines_committed, 2);
    }

    #[test]
    fn flow_empty_line_adds_only_spacing() {
        let bank = bank(&[('a', 10, 20)]);
        let cfg = FlowConfig {
            vertical_jitter: 0,
            ..FlowConfig::default()
        };
        let out = layout_flow("a\n\na", &bank, cfg, &mut NoJitter);
        assert_eq!(out.page.height, 20 + 42 + 22 + 42 + 20);
        assert_eq!(glyph_positions(&out.page)[1], ('a', 20, 84));
    }

    #[test]
    fn flow_space_and_missing_glyph_advance() {
        let bank = bank(&[('a', 10, 20)]);
        let cfg = FlowConfig {
            vertical_jitter: 0,
            ..FlowConfig::default()
        };
        let out = layout_flow("a a#", &bank, cfg, &mut NoJitter);
        // 20 + (10 + 4) + (18 + 4) = 56.
        assert_eq!(glyph_positions(&out.page)[1], ('a', 56, 20));
        assert_eq!(out.page.commands[2].origin(), (70, 20));
        assert_eq!(out.page.height, 20 + 40 + 22 + 20);
        assert_eq!(out.diagnostics.missing_chars, vec!['#']);
    }

    #[test]
    fn flow_jitter_stays_within_amplitude() {
        let bank = bank(&[('a', 10, 20)]);
        let out = layout_flow(
            "aaaaaaaaaaaaaaaa",
            &bank,
            FlowConfig::default(),
            &mut SeededJitter::new(11),
        );
        for (_, _, y) in glyph_positions(&out.page) {
            assert!((17..=23).contains(&y), "y {} outside jitter band", y);
        }
    }

    #[test]
    fn second_word_wraps_to_margin() {
        let bank = bank(&[('a', 50, 20)]);
        let cfg = LayoutConfig {
            space_factor: 0.25,
            ..page_cfg(100, 300, 10)
        };
        let out = layout_paginated("a a", &bank, cfg, &mut NoJitter);
        let placed = glyph_positions(&out.pages[0]);
        assert_eq!(placed[0], ('a', 10, 10));
        assert_eq!(placed[1].1, 10);
        assert!(placed[1].2 > placed[0].2);
        // The space grew the first line to the nominal cell height.
        assert_eq!(placed[1].2, 10 + 40 + 26);
    }

    #[test]
    fn words_are_never_split_across_lines() {
        let bank = bank(&[('a', 12, 20), ('b', 12, 20)]);
        let cfg = page_cfg(200, 2000, 10);
        let text = "ab aab bba abab a bbbb ab ba aaaa bb ab";
        let out = layout_paginated(text, &bank, cfg, &mut NoJitter);
        let glyphs: Vec<GlyphCommand> = out.pages[0].glyphs().copied().collect();
        let mut offset = 0;
        for word in text.split(' ') {
            let len = word.chars().count();
            let ys: Vec<i32> = glyphs[offset..offset + len].iter().map(|g| g.y).collect();
            assert!(ys.windows(2).all(|w| w[0] == w[1]), "word {:?} split", word);
            offset += len;
        }
        assert!(glyphs.iter().all(|g| g.x + g.width as i32 <= 190));
    }

    #[test]
    fn repeated_spaces_widen_the_gap() {
        let bank = bank(&[('a', 10, 20)]);
        let cfg = page_cfg(400, 400, 10);
        let one = layout_paginated("a a", &bank, cfg, &mut NoJitter);
        let two = layout_paginated("a  a", &bank, cfg, &mut NoJitter);
        let x1 = glyph_positions(&one.pages[0])[1].1;
        let x2 = glyph_positions(&two.pages[0])[1].1;
        assert_eq!(x2 - x1, 18);
    }

    #[test]
    fn overwide_word_at_line_start_overflows_in_place() {
        let bank = bank(&[('w', 60, 20)]);
        let cfg = page_cfg(100, 300, 10);
        let out = layout_paginated("ww", &bank, cfg, &mut NoJitter);
        assert_eq!(
            glyph_positions(&out.pages[0]),
            vec![('w', 10, 10), ('w', 70, 10)]
        );
        assert_eq!(out.diagnostics.overwide_words, 1);
    }

    #[test]
    fn overwide_word_after_text_moves_to_next_line() {
        let bank = bank(&[('a', 10, 20), ('w', 60, 20)]);
        let cfg = page_cfg(100, 300, 10);
        let out = layout_paginated("a ww", &bank, cfg, &mut NoJitter);
        let placed = glyph_positions(&out.pages[0]);
        assert_eq!(placed[1], ('w', 10, 10 + 40 + 26));
        assert_eq!(out.diagnostics.overwide_words, 1);
    }

    #[test]
    fn pages_are_numbered_in_order_and_glyphs_start_inside() {
        let bank = bank(&[('a', 20, 30)]);
        let cfg = page_cfg(200, 300, 20);
        let text = vec!["aaaa aaa"; 20].join("\n");
        let out = layout_paginated(&text, &bank, cfg, &mut NoJitter);
        assert!(out.pages.len() > 1);
        for (idx, page) in out.pages.iter().enumerate() {
            assert_eq!(page.page_number, idx + 1);
            assert_eq!((page.width, page.height), (200, 300));
            for g in page.glyphs() {
                assert!(g.y >= 20 && g.y < 280);
            }
        }
        assert_eq!(out.diagnostics.pages_emitted, out.pages.len());
        assert_eq!(out.pages.iter().map(|p| p.glyphs().count()).sum::<usize>(), 140);
    }

    #[test]
    fn empty_text_still_yields_a_page() {
        let out = layout_paginated("", &GlyphBank::new(), LayoutConfig::default(), &mut NoJitter);
        assert_eq!(out.pages.len(), 1);
        assert!(out.pages[0].is_blank());
        assert_eq!((out.pages[0].width, out.pages[0].height), (595, 842));
        assert!(!out.truncated && !out.cancelled);
    }

    #[test]
    fn missing_glyphs_get_placeholders() {
        let out = layout_paginated("xy x", &GlyphBank::new(), LayoutConfig::default(), &mut NoJitter);
        let page = &out.pages[0];
        assert_eq!(page.commands.len(), 3);
        assert!(page
            .commands
            .iter()
            .all(|cmd| matches!(cmd, DrawCommand::MissingGlyph(_)) && cmd.size() == (22, 38)));
        assert_eq!(out.diagnostics.missing_glyphs, 3);
        assert_eq!(out.diagnostics.missing_chars, vec!['x', 'y']);
    }

    #[test]
    fn page_limit_truncates() {
        let bank = bank(&[('a', 20, 30)]);
        let cfg = LayoutConfig {
            max_pages: Some(2),
            ..page_cfg(200, 300, 20)
        };
        let text = vec!["aaaa"; 40].join("\n");
        let out = layout_paginated(&text, &bank, cfg, &mut NoJitter);
        assert_eq!(out.pages.len(), 2);
        assert!(out.truncated);
    }

    struct CancelAfter {
        checks: Cell<usize>,
        limit: usize,
    }

    impl CancelToken for CancelAfter {
        fn is_cancelled(&self) -> bool {
            let n = self.checks.get() + 1;
            self.checks.set(n);
            n > self.limit
        }
    }

    #[test]
    fn cancel_keeps_finished_pages() {
        let bank = bank(&[('a', 20, 30)]);
        let cfg = page_cfg(200, 300, 20);
        let text = vec!["aaaa"; 40].join("\n");
        let cancel = CancelAfter {
            checks: Cell::new(0),
            limit: 1,
        };
        let out = LayoutEngine::new(cfg).layout_text_with_cancel(&text, &bank, &mut NoJitter, &cancel);
        assert!(out.cancelled);
        assert_eq!(out.pages.len(), 1);
        assert!(!out.pages[0].is_blank());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{"margin": 30, "page_size": "LETTER"}"#).expect("parse");
        assert_eq!(cfg.margin, 30);
        assert_eq!(cfg.page_size, PageSize::Letter);
        assert_eq!(cfg.line_spacing, 26);
        let flow: FlowConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(flow, FlowConfig::default());
    }
}
