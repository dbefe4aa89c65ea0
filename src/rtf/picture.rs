//! RTF picture/image handling.
//!
//! Embedded pictures arrive as a stream of hex digits inside a `\pict`
//! group, and `INCLUDEPICTURE` fields name external files. Both are turned
//! into a [`Picture`] by an [`ImageCodec`]. RTF supports several image
//! formats:
//! - Windows Metafile (WMF)
//! - Enhanced Metafile (EMF)
//! - PNG
//! - JPEG
//! - DIB (Device Independent Bitmap)
//! - Mac PICT and OS/2 metafiles

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Screen resolution used to turn twips into pixels.
pub const SCREEN_DPI: u32 = 96;

/// Twips per pixel at [`SCREEN_DPI`].
pub const TWIPS_PER_PIXEL: i32 = 1440 / SCREEN_DPI as i32;

/// Image type in RTF documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// Enhanced Metafile
    Emf,
    /// Windows Metafile
    Wmf,
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// DIB (Device Independent Bitmap)
    Dib,
    /// Mac PICT format
    Pict,
    /// OS/2 Presentation Manager metafile
    Pmm,
    /// Unknown or unsupported format
    Unknown,
}

impl ImageType {
    /// MIME type used to pick a decoder.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageType::Emf => "image/emf",
            ImageType::Wmf => "image/wmf",
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Dib => "image/bmp",
            ImageType::Pict => "image/x-pict",
            ImageType::Pmm => "image/x-pmm",
            ImageType::Unknown => "application/octet-stream",
        }
    }
}

/// A decoded picture ready to be placed in a text model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    /// Image type
    pub image_type: ImageType,
    /// Raw image data
    pub data: Vec<u8>,
    /// Display width in pixels, when known
    pub width: Option<u32>,
    /// Display height in pixels, when known
    pub height: Option<u32>,
}

impl Picture {
    /// Create a new picture with minimal information.
    #[inline]
    pub fn new(image_type: ImageType, data: Vec<u8>) -> Self {
        Self {
            image_type,
            data,
            width: None,
            height: None,
        }
    }

    /// Get the image data as a byte slice.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Scale the display size by the given percentages.
    pub fn apply_scale(&mut self, scale_x: Option<i32>, scale_y: Option<i32>) {
        let scale = |size: Option<u32>, percent: Option<i32>| match (size, percent) {
            (Some(size), Some(percent)) if percent > 0 => {
                Some((u64::from(size) * percent as u64 / 100).min(u64::from(u32::MAX)) as u32)
            },
            (size, _) => size,
        };
        self.width = scale(self.width, scale_x);
        self.height = scale(self.height, scale_y);
    }

    /// Display width in twips, when known.
    #[inline]
    pub fn width_twips(&self) -> Option<i32> {
        self.width.map(pixels_to_twips)
    }

    /// Display height in twips, when known.
    #[inline]
    pub fn height_twips(&self) -> Option<i32> {
        self.height.map(pixels_to_twips)
    }
}

/// Convert twips to pixels at [`SCREEN_DPI`].
#[inline]
pub fn twips_to_pixels(twips: i32) -> Option<u32> {
    u32::try_from(twips / TWIPS_PER_PIXEL).ok().filter(|&px| px > 0)
}

/// Convert pixels to twips at [`SCREEN_DPI`].
#[inline]
pub fn pixels_to_twips(pixels: u32) -> i32 {
    i32::try_from(pixels).unwrap_or(i32::MAX).saturating_mul(TWIPS_PER_PIXEL)
}

/// Image loading errors. These never abort an RTF import.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The codec cannot handle this kind of image
    #[error("unsupported image type {0:?}")]
    Unsupported(ImageType),
    /// The data is not a valid image of the declared type
    #[error("could not decode image: {0}")]
    Decode(String),
    /// Reading an external image failed
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Incremental decoder for one picture.
pub trait ImageLoader {
    /// Request a display size in pixels. Either dimension may be absent; a
    /// missing one follows the aspect ratio of the natural size.
    fn set_size(&mut self, width: Option<u32>, height: Option<u32>);

    /// Feed the next chunk of image data.
    fn write(&mut self, bytes: &[u8]) -> Result<(), ImageError>;

    /// Finish decoding.
    fn finish(self: Box<Self>) -> Result<Picture, ImageError>;
}

/// Factory for image loaders.
pub trait ImageCodec: Send + Sync {
    /// Create a loader for pictures of the given type.
    fn loader(&self, image_type: ImageType) -> Result<Box<dyn ImageLoader>, ImageError>;

    /// Load an external image file, detecting its type from its content.
    fn load_file(&self, path: &Path) -> Result<Picture, ImageError> {
        let data = fs::read(path)?;
        let mut loader = self.loader(detect_image_type(&data))?;
        loader.write(&data)?;
        loader.finish()
    }
}

/// Detect image type from binary signature.
///
/// # Arguments
///
/// * `data` - Binary image data
///
/// # Returns
///
/// Detected image type or Unknown
pub fn detect_image_type(data: &[u8]) -> ImageType {
    if data.starts_with(&[0xFF, 0xD8]) {
        return ImageType::Jpeg;
    }

    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return ImageType::Png;
    }

    // EMF: record type 1 followed by the " EMF" marker at offset 40
    if data.len() >= 44 && data[0..4] == [0x01, 0x00, 0x00, 0x00] && data[40..44] == *b" EMF" {
        return ImageType::Emf;
    }

    // Aldus Placeable Metafile
    if data.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) {
        return ImageType::Wmf;
    }

    if data.starts_with(b"BM") {
        return ImageType::Dib;
    }

    ImageType::Unknown
}

/// Natural pixel size read from the PNG header.
#[cfg(not(feature = "imgconv"))]
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let header = data.get(16..24)?;
    let width = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let height = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    Some((width, height))
}

/// Combine a requested size with the natural size, keeping the aspect
/// ratio when only one dimension was requested.
fn resolve_size(
    requested: (Option<u32>, Option<u32>),
    natural: Option<(u32, u32)>,
) -> (Option<u32>, Option<u32>) {
    match (requested, natural) {
        ((Some(w), Some(h)), _) => (Some(w), Some(h)),
        ((Some(w), None), Some((nw, nh))) if nw > 0 => {
            (Some(w), Some((u64::from(w) * u64::from(nh) / u64::from(nw)) as u32))
        },
        ((None, Some(h)), Some((nw, nh))) if nh > 0 => {
            (Some((u64::from(h) * u64::from(nw) / u64::from(nh)) as u32), Some(h))
        },
        ((None, None), Some((nw, nh))) => (Some(nw), Some(nh)),
        (requested, _) => requested,
    }
}

/// Default codec.
///
/// Keeps image bytes as they are and checks the signatures of formats it
/// can recognize. With the `imgconv` feature, raster formats are decoded
/// with the `image` crate to validate them and obtain their natural size.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCodec;

impl ImageCodec for BuiltinCodec {
    fn loader(&self, image_type: ImageType) -> Result<Box<dyn ImageLoader>, ImageError> {
        Ok(Box::new(BufferedLoader {
            image_type,
            data: Vec::new(),
            requested: (None, None),
        }))
    }
}

/// Loader that collects the whole stream and validates it on finish.
struct BufferedLoader {
    image_type: ImageType,
    data: Vec<u8>,
    requested: (Option<u32>, Option<u32>),
}

impl BufferedLoader {
    #[cfg(not(feature = "imgconv"))]
    fn natural_size(&self) -> Result<Option<(u32, u32)>, ImageError> {
        match self.image_type {
            ImageType::Png | ImageType::Jpeg if detect_image_type(&self.data) != self.image_type => {
                Err(ImageError::Decode(format!(
                    "data does not look like {}",
                    self.image_type.mime_type()
                )))
            },
            ImageType::Png => Ok(png_dimensions(&self.data)),
            _ => Ok(None),
        }
    }

    #[cfg(feature = "imgconv")]
    fn natural_size(&self) -> Result<Option<(u32, u32)>, ImageError> {
        use image::{GenericImageView, ImageFormat};

        let format = match self.image_type {
            ImageType::Png => ImageFormat::Png,
            ImageType::Jpeg => ImageFormat::Jpeg,
            ImageType::Dib if self.data.starts_with(b"BM") => ImageFormat::Bmp,
            _ => return Ok(None),
        };
        let decoded = image::load_from_memory_with_format(&self.data, format)
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        Ok(Some(decoded.dimensions()))
    }
}

impl ImageLoader for BufferedLoader {
    fn set_size(&mut self, width: Option<u32>, height: Option<u32>) {
        self.requested = (width, height);
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Picture, ImageError> {
        if self.data.is_empty() {
            return Err(ImageError::Decode("no image data".to_string()));
        }
        let natural = self.natural_size()?;
        let (width, height) = resolve_size(self.requested, natural);
        Ok(Picture {
            image_type: self.image_type,
            data: self.data,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest valid PNG: 1x1 transparent pixel.
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_detect_png() {
        assert_eq!(detect_image_type(TINY_PNG), ImageType::Png);
    }

    #[test]
    fn test_detect_jpeg() {
        let jpeg_sig = vec![0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detect_image_type(&jpeg_sig), ImageType::Jpeg);
        assert_eq!(detect_image_type(b"hello"), ImageType::Unknown);
    }

    #[test]
    fn test_builtin_codec_natural_size() {
        let mut loader = BuiltinCodec.loader(ImageType::Png).unwrap();
        loader.write(&TINY_PNG[..10]).unwrap();
        loader.write(&TINY_PNG[10..]).unwrap();
        let picture = loader.finish().unwrap();
        assert_eq!(picture.width, Some(1));
        assert_eq!(picture.height, Some(1));
        assert_eq!(picture.data, TINY_PNG);
    }

    #[test]
    fn test_builtin_codec_rejects_bad_png() {
        let mut loader = BuiltinCodec.loader(ImageType::Png).unwrap();
        loader.write(b"definitely not a png").unwrap();
        assert!(matches!(loader.finish(), Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_requested_size_keeps_aspect() {
        assert_eq!(resolve_size((Some(20), None), Some((10, 5))), (Some(20), Some(10)));
        assert_eq!(resolve_size((None, None), Some((10, 5))), (Some(10), Some(5)));
        assert_eq!(resolve_size((None, Some(7)), None), (None, Some(7)));
    }

    #[test]
    fn test_picture_scaling() {
        let mut pic = Picture::new(ImageType::Png, vec![]);
        pic.width = Some(96);
        pic.height = Some(48);
        pic.apply_scale(Some(200), None);
        assert_eq!(pic.width, Some(192));
        assert_eq!(pic.height, Some(48));
        assert_eq!(pic.width_twips(), Some(2880));
        assert_eq!(twips_to_pixels(1440), Some(96));
        assert_eq!(twips_to_pixels(0), None);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        fs::write(&path, TINY_PNG).unwrap();
        let picture = BuiltinCodec.load_file(&path).unwrap();
        assert_eq!(picture.image_type, ImageType::Png);
        assert!(matches!(
            BuiltinCodec.load_file(&dir.path().join("missing.png")),
            Err(ImageError::Io(_))
        ));
    }
}
