//! Error and status types for glyph extraction.

use core::fmt;

/// Failure reported by a region detector. Propagated to callers unchanged.
#[derive(Debug)]
pub struct DetectorError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DetectorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DetectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region detection failed: {}", self.message)
    }
}

impl std::error::Error for DetectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Extraction error.
#[derive(Debug)]
pub enum ExtractError {
    /// Caller supplied zero target characters.
    EmptyCharacterSequence,
    /// Source image has a zero dimension.
    EmptyImage,
    /// Region detector failed.
    Detector(DetectorError),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCharacterSequence => write!(f, "character sequence is empty"),
            Self::EmptyImage => write!(f, "source image has no pixels"),
            Self::Detector(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Detector(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DetectorError> for ExtractError {
    fn from(value: DetectorError) -> Self {
        Self::Detector(value)
    }
}

/// User-visible outcome of a successful extraction pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractStatus {
    /// Every requested character received a glyph.
    Complete { glyphs: usize },
    /// Fewer regions than requested characters; trailing characters are unassigned.
    Partial { found: usize, requested: usize },
    /// No region survived the minimum-area filter. The bank is empty.
    NoInputRegions,
}

impl ExtractStatus {
    pub fn is_usable(self) -> bool {
        !matches!(self, Self::NoInputRegions)
    }
}

impl fmt::Display for ExtractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete { glyphs } => write!(f, "extracted {} glyphs", glyphs),
            Self::Partial { found, requested } => write!(
                f,
                "found {} glyph regions for {} requested characters",
                found, requested
            ),
            Self::NoInputRegions => write!(
                f,
                "no glyph regions found; try a lower minimum area or a clearer scan"
            ),
        }
    }
}

/// Glyph bank save/load error.
#[derive(Debug)]
pub enum GlyphIoError {
    Io(std::io::Error),
    Image(image::ImageError),
}

impl fmt::Display for GlyphIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "glyph io failed: {}", err),
            Self::Image(err) => write!(f, "glyph image codec failed: {}", err),
        }
    }
}

impl std::error::Error for GlyphIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Image(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for GlyphIoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<image::ImageError> for GlyphIoError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value)
    }
}
