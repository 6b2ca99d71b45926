//! PDF document encoder for rasterized `scrawl` pages.
//!
//! Each page raster becomes a Flate-compressed DeviceGray image XObject
//! stretched over one page of the requested size.

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

use core::fmt;

use image::GrayImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use scrawl::{DocumentEncoder, PageSize};

const PDF_VERSION: &str = "1.5";
const IMAGE_NAME: &[u8] = b"Im0";

/// PDF encoding error.
#[derive(Debug)]
pub enum EncodeError {
    /// No pages were supplied.
    NoPages,
    /// A page raster has a zero dimension.
    EmptyPage { index: usize },
    Pdf(lopdf::Error),
    Io(std::io::Error),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPages => write!(f, "no pages to encode"),
            Self::EmptyPage { index } => write!(f, "page {} has no pixels", index + 1),
            Self::Pdf(err) => write!(f, "pdf encoding failed: {}", err),
            Self::Io(err) => write!(f, "pdf write failed: {}", err),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for EncodeError {
    fn from(value: lopdf::Error) -> Self {
        Self::Pdf(value)
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// [`DocumentEncoder`] producing PDF bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PdfEncoder {
    /// zlib level for image streams (0-10).
    pub compression_level: u8,
}

impl Default for PdfEncoder {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

impl PdfEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn image_stream(&self, page: &GrayImage) -> Stream {
        let data = miniz_oxide::deflate::compress_to_vec_zlib(page.as_raw(), self.compression_level);
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(page.width()),
            "Height" => i64::from(page.height()),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        Stream::new(dict, data)
    }

    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        page: &GrayImage,
        page_size: PageSize,
    ) -> Result<ObjectId, EncodeError> {
        let (width, height) = page_size.dimensions();
        let (width, height) = (i64::from(width), i64::from(height));
        let image_id = doc.add_object(self.image_stream(page));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(width),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(height),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        Ok(page_id)
    }
}

impl DocumentEncoder for PdfEncoder {
    type Error = EncodeError;

    fn encode_document(
        &self,
        pages: &[GrayImage],
        page_size: PageSize,
    ) -> Result<Vec<u8>, Self::Error> {
        if pages.is_empty() {
            return Err(EncodeError::NoPages);
        }
        if let Some(index) = pages
            .iter()
            .position(|page| page.width() == 0 || page.height() == 0)
        {
            return Err(EncodeError::EmptyPage { index });
        }

        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let page_id = self.add_page(&mut doc, pages_id, page, page_size)?;
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        log::debug!(
            "encoded {} pages at {} into {} bytes",
            pages.len(),
            page_size,
            out.len()
        );
        Ok(out)
    }
}
