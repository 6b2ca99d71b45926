use serde::{Deserialize, Serialize};

/// Page represented as backend-agnostic draw commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
    /// Draw commands in placement order.
    pub commands: Vec<DrawCommand>,
}

impl RenderPage {
    /// Create an empty page.
    pub fn new(page_number: usize, width: u32, height: u32) -> Self {
        Self {
            page_number,
            width,
            height,
            // Blank pages stay allocation-free.
            commands: Vec::with_capacity(0),
        }
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn is_blank(&self) -> bool {
        self.commands.is_empty()
    }

    /// Glyph commands only, in placement order.
    pub fn glyphs(&self) -> impl Iterator<Item = &GlyphCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Glyph(glyph) => Some(glyph),
            DrawCommand::MissingGlyph(_) => None,
        })
    }
}

/// Backend-agnostic draw command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Draw a bank glyph scaled into its box.
    Glyph(GlyphCommand),
    /// Placeholder for a character the bank lacks.
    MissingGlyph(PlaceholderCommand),
}

impl DrawCommand {
    /// Top-left corner after jitter.
    pub fn origin(&self) -> (i32, i32) {
        match self {
            Self::Glyph(cmd) => (cmd.x, cmd.y),
            Self::MissingGlyph(cmd) => (cmd.x, cmd.y),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Glyph(cmd) => (cmd.width, cmd.height),
            Self::MissingGlyph(cmd) => (cmd.width, cmd.height),
        }
    }
}

/// Glyph draw command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphCommand {
    /// Bank key.
    pub ch: char,
    /// Left x.
    pub x: i32,
    /// Top y, jitter included.
    pub y: i32,
    /// Scaled width.
    pub width: u32,
    /// Scaled height.
    pub height: u32,
    /// Rotation about the box center, in degrees.
    pub rotation_deg: f32,
}

/// Missing-glyph placeholder command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaceholderCommand {
    /// Character that had no glyph.
    pub ch: char,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Counters collected while laying out one text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDiagnostics {
    /// Placeholder draws.
    pub missing_glyphs: usize,
    /// Distinct characters without a glyph, sorted.
    pub missing_chars: Vec<char>,
    /// Lines committed, including empty ones.
    pub lines_committed: usize,
    /// Pages handed to the caller.
    pub pages_emitted: usize,
    /// Words wider than the usable width, drawn past the right margin.
    pub overwide_words: usize,
}

impl LayoutDiagnostics {
    pub(crate) fn record_missing(&mut self, ch: char) {
        self.missing_glyphs += 1;
        if let Err(pos) = self.missing_chars.binary_search(&ch) {
            log::warn!("no glyph for {:?}; drawing placeholder", ch);
            self.missing_chars.insert(pos, ch);
        }
    }

    pub fn has_missing_glyphs(&self) -> bool {
        self.missing_glyphs > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_chars_stay_sorted_and_unique() {
        let mut diag = LayoutDiagnostics::default();
        for ch in ['z', 'a', 'z', 'm', 'a'] {
            diag.record_missing(ch);
        }
        assert_eq!(diag.missing_glyphs, 5);
        assert_eq!(diag.missing_chars, vec!['a', 'm', 'z']);
    }

    #[test]
    fn page_filters_glyph_commands() {
        let mut page = RenderPage::new(1, 100, 100);
        assert!(page.is_blank());
        page.push(DrawCommand::MissingGlyph(PlaceholderCommand {
            ch: '#',
            x: 0,
            y: 0,
            width: 22,
            height: 38,
        }));
        page.push(DrawCommand::Glyph(GlyphCommand {
            ch: 'a',
            x: 30,
            y: 2,
            width: 10,
            height: 12,
            rotation_deg: 0.0,
        }));
        let chars: Vec<char> = page.glyphs().map(|g| g.ch).collect();
        assert_eq!(chars, vec!['a']);
        assert_eq!(page.commands[1].origin(), (30, 2));
        assert_eq!(page.commands[0].size(), (22, 38));
    }
}
