//! Image encoding
//!
//! PNG output carries a `Software` text chunk and, when known, the ICC
//! profile of the captured screen. Other formats are written bare.

use image::{DynamicImage, RgbaImage};
use log::debug;
use std::borrow::Cow;
use std::io::Cursor;

use crate::app::state::ColorProfile;
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::save::format::SaveFormat;

pub const SOFTWARE_KEYWORD: &str = "Software";
pub const SOFTWARE_NAME: &str = "shutterbug";

pub fn encode(
    image: &RgbaImage,
    format: SaveFormat,
    color_profile: Option<&ColorProfile>,
) -> ScreenshotResult<Vec<u8>> {
    debug!(
        "Encoding {}x{} capture as {}",
        image.width(),
        image.height(),
        format.name()
    );

    if format.supports_metadata() {
        encode_png(image, color_profile)
    } else {
        encode_plain(image, format)
    }
}

fn encode_png(image: &RgbaImage, color_profile: Option<&ColorProfile>) -> ScreenshotResult<Vec<u8>> {
    let mut buffer = Vec::new();

    let mut info = png::Info::with_size(image.width(), image.height());
    if let Some(profile) = color_profile {
        info.icc_profile = Some(Cow::Owned(profile.to_bytes()?));
    }

    let mut encoder = png::Encoder::with_info(&mut buffer, info).map_err(encode_error)?;
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .add_text_chunk(SOFTWARE_KEYWORD.to_string(), SOFTWARE_NAME.to_string())
        .map_err(encode_error)?;

    let mut writer = encoder.write_header().map_err(encode_error)?;
    writer
        .write_image_data(image.as_raw())
        .map_err(encode_error)?;
    writer.finish().map_err(encode_error)?;

    Ok(buffer)
}

fn encode_plain(image: &RgbaImage, format: SaveFormat) -> ScreenshotResult<Vec<u8>> {
    let image = if format.has_alpha() {
        DynamicImage::ImageRgba8(image.clone())
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image.clone()).to_rgb8())
    };

    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, format.image_format())
        .map_err(encode_error)?;

    Ok(cursor.into_inner())
}

fn encode_error(err: impl std::fmt::Display) -> ScreenshotError {
    ScreenshotError::EncodeWrite(err.to_string())
}
