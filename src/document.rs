//! Page-size presets and the document encoder seam.

use core::fmt;
use core::str::FromStr;

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Output page size in pixels, using points-as-pixels for the presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PageSize {
    /// 595×842.
    #[default]
    A4,
    /// 612×792.
    Letter,
    /// Explicit page dimensions.
    Custom { width: u32, height: u32 },
}

impl PageSize {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::A4 => (595, 842),
            Self::Letter => (612, 792),
            Self::Custom { width, height } => (width, height),
        }
    }

    pub fn width(self) -> u32 {
        self.dimensions().0
    }

    pub fn height(self) -> u32 {
        self.dimensions().1
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A4 => write!(f, "A4"),
            Self::Letter => write!(f, "LETTER"),
            Self::Custom { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

/// Unrecognized page-size name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsePageSizeError(String);

impl fmt::Display for ParsePageSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown page size '{}' (expected A4, LETTER, or <w>x<h>)",
            self.0
        )
    }
}

impl std::error::Error for ParsePageSizeError {}

impl FromStr for PageSize {
    type Err = ParsePageSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value.to_ascii_lowercase().as_str() {
            "a4" => return Ok(Self::A4),
            "letter" => return Ok(Self::Letter),
            _ => {}
        }
        let (w, h) = value
            .split_once(['x', 'X'])
            .ok_or_else(|| ParsePageSizeError(s.to_string()))?;
        let width = w.trim().parse::<u32>().ok().filter(|v| *v > 0);
        let height = h.trim().parse::<u32>().ok().filter(|v| *v > 0);
        match (width, height) {
            (Some(width), Some(height)) => Ok(Self::Custom { width, height }),
            _ => Err(ParsePageSizeError(s.to_string())),
        }
    }
}

/// Packs an ordered sequence of page rasters into a document byte stream.
///
/// Failures are surfaced unchanged through `Self::Error`; callers do not
/// retry.
pub trait DocumentEncoder {
    type Error: std::error::Error + 'static;

    fn encode_document(
        &self,
        pages: &[GrayImage],
        page_size: PageSize,
    ) -> Result<Vec<u8>, Self::Error>;
}
