//! Output format selection from the target's file extension.

use image::ImageFormat;
use std::path::Path;

/// Codecs we can write an RGBA capture with
const WRITER_FORMATS: [ImageFormat; 9] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::Ico,
    ImageFormat::Tga,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Qoi,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveFormat(ImageFormat);

impl Default for SaveFormat {
    fn default() -> Self {
        Self(ImageFormat::Png)
    }
}

impl SaveFormat {
    /// Writer-capable formats available in this build.
    pub fn writable() -> impl Iterator<Item = SaveFormat> {
        WRITER_FORMATS
            .into_iter()
            .filter(|format| format.writing_enabled())
            .map(SaveFormat)
    }

    /// Case-sensitive match against the extensions each writer declares.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::writable().find(|format| format.0.extensions_str().contains(&extension))
    }

    /// Text after the last dot of the file name; PNG when there is none or
    /// when no writer claims it.
    pub fn for_path(path: &Path) -> Self {
        let Some(file_name) = path.file_name().map(|name| name.to_string_lossy()) else {
            return Self::default();
        };

        match file_name.rsplit_once('.') {
            Some((_, extension)) => Self::from_extension(extension).unwrap_or_default(),
            None => Self::default(),
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        self.0
    }

    pub fn is_png(&self) -> bool {
        self.0 == ImageFormat::Png
    }

    /// PNG is the only format that carries the text and profile metadata.
    pub fn supports_metadata(&self) -> bool {
        self.is_png()
    }

    pub fn has_alpha(&self) -> bool {
        !matches!(self.0, ImageFormat::Jpeg)
    }

    pub fn mime_type(&self) -> &'static str {
        self.0.to_mime_type()
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Ico => "ico",
            ImageFormat::Tga => "tga",
            ImageFormat::WebP => "webp",
            ImageFormat::Gif => "gif",
            ImageFormat::Qoi => "qoi",
            _ => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions_select_their_codec() {
        let cases = [
            ("shot.png", ImageFormat::Png),
            ("shot.jpg", ImageFormat::Jpeg),
            ("shot.jpeg", ImageFormat::Jpeg),
            ("shot.bmp", ImageFormat::Bmp),
            ("shot.tif", ImageFormat::Tiff),
            ("shot.tiff", ImageFormat::Tiff),
            ("shot.webp", ImageFormat::WebP),
        ];

        for (name, expected) in cases {
            assert_eq!(
                SaveFormat::for_path(Path::new(name)).image_format(),
                expected,
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_every_declared_extension_maps_back() {
        for format in SaveFormat::writable() {
            for extension in format.image_format().extensions_str() {
                let path = format!("capture.{}", extension);
                assert_eq!(SaveFormat::for_path(Path::new(&path)), format);
            }
        }
    }

    #[test]
    fn test_falls_back_to_png() {
        for name in ["shot", "shot.xyz", "archive.tar.gz", "shot.", ".hidden"] {
            assert!(SaveFormat::for_path(Path::new(name)).is_png(), "{}", name);
        }
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(SaveFormat::for_path(Path::new("shot.JPG")).is_png());
    }

    #[test]
    fn test_uses_last_dot_of_the_file_name_only() {
        assert_eq!(
            SaveFormat::for_path(Path::new("/tmp/dir.jpg/shot")),
            SaveFormat::default()
        );
        assert_eq!(
            SaveFormat::for_path(Path::new("/tmp/v1.2/shot.final.jpg")).name(),
            "jpeg"
        );
    }

    #[test]
    fn test_metadata_only_for_png() {
        assert!(SaveFormat::default().supports_metadata());
        assert!(!SaveFormat::for_path(Path::new("x.jpg")).supports_metadata());
        assert_eq!(SaveFormat::default().mime_type(), "image/png");
    }
}
