//! The `\pict` destination.
//!
//! Picture data arrives as hex digits after the type and size words. Bytes
//! are streamed to a loader from the import's [`ImageCodec`] as they are
//! decoded; the finished picture is handed to the parent on close.
//!
//! [`ImageCodec`]: crate::rtf::picture::ImageCodec

use crate::common::encoding::hex_nibble;
use crate::rtf::context::ParserContext;
use crate::rtf::control::{self, ControlTable, ControlWord};
use crate::rtf::destination::{Destination, DestinationKind, Frame, Outcome};
use crate::rtf::error::{DiagnosticKind, RtfError, RtfResult};
use crate::rtf::picture::{ImageLoader, ImageType, twips_to_pixels};
use phf::phf_map;

#[derive(Default)]
pub struct PictureDest {
    image_type: Option<ImageType>,
    loader: Option<Box<dyn ImageLoader>>,
    /// First decode error; later data is dropped
    failure: Option<String>,
    /// High nibble waiting for its partner
    carry: Option<u8>,
    /// `\picw` and `\pich`
    width: Option<i32>,
    height: Option<i32>,
    /// `\picwgoal` and `\pichgoal`, in twips
    goal_width: Option<i32>,
    goal_height: Option<i32>,
    scale_x: Option<i32>,
    scale_y: Option<i32>,
}

impl PictureDest {
    pub fn boxed() -> Box<dyn Destination> {
        Frame::boxed(PictureDest::default(), ())
    }

    fn requested_size(&self) -> (Option<u32>, Option<u32>) {
        (
            self.goal_width.and_then(twips_to_pixels),
            self.goal_height.and_then(twips_to_pixels),
        )
    }

    fn update_size(&mut self) {
        let (width, height) = self.requested_size();
        if let Some(loader) = self.loader.as_mut() {
            loader.set_size(width, height);
        }
    }

    fn write(&mut self, ctx: &ParserContext<'_>, bytes: &[u8]) {
        if self.failure.is_some() || bytes.is_empty() {
            return;
        }
        if self.loader.is_none() {
            match ctx.codec().loader(self.image_type.unwrap_or(ImageType::Unknown)) {
                Ok(loader) => self.loader = Some(loader),
                Err(e) => {
                    self.failure = Some(e.to_string());
                    return;
                },
            }
            self.update_size();
        }
        if let Some(loader) = self.loader.as_mut()
            && let Err(e) = loader.write(bytes)
        {
            self.failure = Some(e.to_string());
            self.loader = None;
        }
    }
}

impl DestinationKind for PictureDest {
    type State = ();

    const NAME: &'static str = "pict";

    fn lookup(name: &str) -> Option<&'static ControlWord<Self>> {
        control::lookup(&PICTURE_WORDS, name)
    }

    fn text(&mut self, ctx: &mut ParserContext<'_>, _: &mut (), text: &str) -> RtfResult<()> {
        let mut bytes = Vec::with_capacity(text.len() / 2);
        for nibble in text.bytes().filter_map(hex_nibble) {
            match self.carry.take() {
                Some(high) => bytes.push(high << 4 | nibble),
                None => self.carry = Some(nibble),
            }
        }
        self.write(ctx, &bytes);
        Ok(())
    }

    fn byte(&mut self, _: &mut ParserContext<'_>, _: &mut (), _: u8) -> RtfResult<()> {
        Ok(())
    }

    fn finish(self, ctx: &mut ParserContext<'_>, _: ()) -> RtfResult<Outcome> {
        if let Some(failure) = self.failure {
            ctx.warn(DiagnosticKind::ImageDecode, format!("dropping picture: {failure}"));
            return Ok(Outcome::Nothing);
        }
        let Some(loader) = self.loader else {
            ctx.warn(DiagnosticKind::ImageDecode, "picture has no data".to_string());
            return Ok(Outcome::Nothing);
        };
        match loader.finish() {
            Ok(mut picture) => {
                let pixels = |size: Option<i32>| size.and_then(|s| u32::try_from(s).ok()).filter(|&s| s > 0);
                picture.width = picture.width.or(pixels(self.width));
                picture.height = picture.height.or(pixels(self.height));
                picture.apply_scale(self.scale_x, self.scale_y);
                Ok(Outcome::Picture(picture))
            },
            Err(e) => {
                ctx.warn(DiagnosticKind::ImageDecode, format!("dropping picture: {e}"));
                Ok(Outcome::Nothing)
            },
        }
    }
}

type Word = ControlWord<PictureDest>;

static PICTURE_WORDS: ControlTable<PictureDest> = phf_map! {
    "pngblip" => Word::flag(png),
    "jpegblip" => Word::flag(jpeg),
    "emfblip" => Word::flag(emf),
    "macpict" => Word::flag(pict),
    "wmetafile" => Word::value(1, wmf),
    "dibitmap" => Word::value(0, dib),
    "wbitmap" => Word::value(0, dib),
    "pmmetafile" => Word::value(0, pmm),
    "picw" => Word::required(width),
    "pich" => Word::required(height),
    "picwgoal" => Word::required(goal_width),
    "pichgoal" => Word::required(goal_height),
    "picscalex" => Word::required(scale_x),
    "picscaley" => Word::required(scale_y),
};

fn set_type(dest: &mut PictureDest, image_type: ImageType) -> RtfResult<()> {
    dest.image_type = Some(image_type);
    Ok(())
}

fn png(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), _: i32) -> RtfResult<()> {
    set_type(dest, ImageType::Png)
}

fn jpeg(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), _: i32) -> RtfResult<()> {
    set_type(dest, ImageType::Jpeg)
}

fn emf(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), _: i32) -> RtfResult<()> {
    set_type(dest, ImageType::Emf)
}

fn pict(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), _: i32) -> RtfResult<()> {
    set_type(dest, ImageType::Pict)
}

fn wmf(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), mapping_mode: i32) -> RtfResult<()> {
    if !(1..=8).contains(&mapping_mode) {
        return Err(RtfError::BadPictureType(format!(
            "\\wmetafile{mapping_mode} has no such mapping mode"
        )));
    }
    set_type(dest, ImageType::Wmf)
}

fn dib(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), bitmap_type: i32) -> RtfResult<()> {
    if bitmap_type != 0 {
        return Err(RtfError::BadPictureType(format!(
            "bitmap type {bitmap_type} is not 0"
        )));
    }
    set_type(dest, ImageType::Dib)
}

fn pmm(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), _: i32) -> RtfResult<()> {
    set_type(dest, ImageType::Pmm)
}

fn width(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), value: i32) -> RtfResult<()> {
    dest.width = Some(value);
    Ok(())
}

fn height(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), value: i32) -> RtfResult<()> {
    dest.height = Some(value);
    Ok(())
}

fn goal_width(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), twips: i32) -> RtfResult<()> {
    dest.goal_width = Some(twips);
    dest.update_size();
    Ok(())
}

fn goal_height(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), twips: i32) -> RtfResult<()> {
    dest.goal_height = Some(twips);
    dest.update_size();
    Ok(())
}

fn scale_x(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), percent: i32) -> RtfResult<()> {
    dest.scale_x = Some(percent);
    Ok(())
}

fn scale_y(dest: &mut PictureDest, _: &mut ParserContext<'_>, _: &mut (), percent: i32) -> RtfResult<()> {
    dest.scale_y = Some(percent);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::encoding::encode_hex_into;
    use crate::rtf::picture::BuiltinCodec;

    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn png_hex() -> String {
        let mut hex = String::new();
        encode_hex_into(TINY_PNG, &mut hex);
        hex
    }

    #[test]
    fn test_png_picture_with_goal_size() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut frame = Frame::new(PictureDest::default(), ());
        frame.control(&mut ctx, "pngblip", None).unwrap();
        frame.control(&mut ctx, "picwgoal", Some(1500)).unwrap();
        frame.control(&mut ctx, "pichgoal", Some(1500)).unwrap();
        frame.control(&mut ctx, "picscalex", Some(50)).unwrap();

        // Data split mid-byte across text runs
        let hex = png_hex();
        let (head, tail) = hex.split_at(9);
        frame.text(&mut ctx, head).unwrap();
        frame.text(&mut ctx, tail).unwrap();

        let Outcome::Picture(picture) = Box::new(frame).finish(&mut ctx).unwrap() else {
            panic!("expected a picture");
        };
        assert_eq!(picture.image_type, ImageType::Png);
        assert_eq!(picture.data, TINY_PNG);
        assert_eq!((picture.width, picture.height), (Some(50), Some(100)));
    }

    #[test]
    fn test_bad_picture_types() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut frame = Frame::new(PictureDest::default(), ());
        assert!(frame.control(&mut ctx, "wmetafile", Some(8)).is_ok());
        assert!(matches!(
            frame.control(&mut ctx, "wmetafile", Some(9)),
            Err(RtfError::BadPictureType(_))
        ));
        assert!(matches!(
            frame.control(&mut ctx, "dibitmap", Some(1)),
            Err(RtfError::BadPictureType(_))
        ));
    }

    #[test]
    fn test_undecodable_picture_is_dropped() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut frame = Frame::new(PictureDest::default(), ());
        frame.control(&mut ctx, "pngblip", None).unwrap();
        frame.text(&mut ctx, "deadbeef").unwrap();
        let outcome = Box::new(frame).finish(&mut ctx).unwrap();
        assert!(matches!(outcome, Outcome::Nothing));

        let (_, diagnostics) = ctx.into_output();
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ImageDecode);
    }
}
