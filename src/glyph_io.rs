//! Glyph bank persistence as one PNG per character.
//!
//! Characters that are awkward in file names are written under a fixed
//! alias (`?` becomes `qmark.png`, `.` becomes `dot.png`, and so on).
//! Characters that cannot appear in a portable file name (path separators,
//! control characters, whitespace, Windows-reserved punctuation) are written
//! as `u` plus their lowercase hex code point, e.g. `/` becomes `u002f.png`.
//! Every other character is written under its own name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GlyphIoError;
use crate::glyph_bank::{Glyph, GlyphBank};

/// File-name aliases for punctuation.
pub const SPECIAL_ALIASES: &[(char, &str)] = &[
    ('"', "dq"),
    ('\'', "sq"),
    (':', "colon"),
    (';', "semicolon"),
    ('?', "qmark"),
    ('!', "emark"),
    ('-', "dash"),
    ('_', "underscore"),
    ('(', "lparen"),
    (')', "rparen"),
    ('[', "lbracket"),
    (']', "rbracket"),
    ('{', "lbrace"),
    ('}', "rbrace"),
    ('.', "dot"),
    (',', "comma"),
];

fn needs_escape(ch: char) -> bool {
    ch.is_control()
        || ch.is_whitespace()
        || matches!(ch, '/' | '\\' | '<' | '>' | '|' | '*' | ':' | '"' | '?')
}

/// File stem used for `ch`.
pub fn file_stem_for(ch: char) -> String {
    if let Some((_, alias)) = SPECIAL_ALIASES.iter().find(|(c, _)| *c == ch) {
        return (*alias).to_string();
    }
    if needs_escape(ch) {
        return format!("u{:04x}", u32::from(ch));
    }
    ch.to_string()
}

fn unescape_stem(stem: &str) -> Option<char> {
    let hex = stem.strip_prefix('u')?;
    if hex.len() < 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Character a file stem stands for, if any.
pub fn char_for_file_stem(stem: &str) -> Option<char> {
    if let Some((ch, _)) = SPECIAL_ALIASES.iter().find(|(_, alias)| *alias == stem) {
        return Some(*ch);
    }
    if let Some(ch) = unescape_stem(stem) {
        return Some(ch);
    }
    let mut chars = stem.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// Write every glyph in `bank` to `dir` as `<stem>.png`.
///
/// Returns the written paths in character order.
pub fn save_glyph_bank(bank: &GlyphBank, dir: &Path) -> Result<Vec<PathBuf>, GlyphIoError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(bank.len());
    for ch in bank.characters() {
        let Some(glyph) = bank.get(ch) else {
            continue;
        };
        let path = dir.join(format!("{}.png", file_stem_for(ch)));
        glyph.bitmap().save(&path)?;
        written.push(path);
    }
    log::info!("saved {} glyphs to {}", written.len(), dir.display());
    Ok(written)
}

/// Load a bank from a directory written by [`save_glyph_bank`].
///
/// PNG files whose stem is not a single character, a known alias, or an
/// escaped code point are skipped.
pub fn load_glyph_bank(dir: &Path) -> Result<GlyphBank, GlyphIoError> {
    let mut bank = GlyphBank::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    entries.sort();

    for path in entries {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(ch) = char_for_file_stem(stem) else {
            log::debug!("skipping non-glyph file {}", path.display());
            continue;
        };
        let bitmap = image::open(&path)?.to_luma8();
        bank.insert(ch, Glyph::new(bitmap));
    }
    log::debug!("loaded {} glyphs from {}", bank.len(), dir.display());
    Ok(bank)
}
