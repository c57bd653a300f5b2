//! Border effects for window captures

use image::{imageops, Rgba, RgbaImage};
use log::debug;

use crate::app::BorderEffect;

const SHADOW_RADIUS: u32 = 8;
const SHADOW_OFFSET: u32 = 3;
const SHADOW_OPACITY: u8 = 128;
const BORDER_WIDTH: u32 = 1;
const BORDER_COLOR: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 0xff]);

/// Applies exactly one effect; `None` hands the image back untouched.
pub fn apply(effect: BorderEffect, image: RgbaImage) -> RgbaImage {
    debug!("Applying border effect {:?}", effect);
    match effect {
        BorderEffect::Shadow => add_shadow(&image),
        BorderEffect::Border => add_border(&image),
        BorderEffect::Vintage => add_vintage(&image),
        BorderEffect::None => image,
    }
}

/// Transparent margin with a soft drop shadow under the window.
pub fn add_shadow(image: &RgbaImage) -> RgbaImage {
    let margin = SHADOW_RADIUS * 2;
    let (width, height) = (image.width() + margin * 2, image.height() + margin * 2);

    let mut shadow = RgbaImage::new(width, height);
    let shadow_color = Rgba([0, 0, 0, SHADOW_OPACITY]);
    for y in 0..image.height() {
        for x in 0..image.width() {
            shadow.put_pixel(
                x + margin + SHADOW_OFFSET,
                y + margin + SHADOW_OFFSET,
                shadow_color,
            );
        }
    }

    let mut canvas = imageops::blur(&shadow, SHADOW_RADIUS as f32 / 2.0);
    imageops::overlay(&mut canvas, image, margin as i64, margin as i64);
    canvas
}

/// Thin dark frame around the window.
pub fn add_border(image: &RgbaImage) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(
        image.width() + BORDER_WIDTH * 2,
        image.height() + BORDER_WIDTH * 2,
        BORDER_COLOR,
    );
    imageops::overlay(
        &mut canvas,
        image,
        BORDER_WIDTH as i64,
        BORDER_WIDTH as i64,
    );
    canvas
}

/// Sepia toned, framed.
pub fn add_vintage(image: &RgbaImage) -> RgbaImage {
    let mut toned = image.clone();
    for pixel in toned.pixels_mut() {
        *pixel = sepia(*pixel);
    }
    add_border(&toned)
}

fn sepia(pixel: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let tone = |cr: f32, cg: f32, cb: f32| (r * cr + g * cg + b * cb).min(255.0) as u8;

    Rgba([
        tone(0.393, 0.769, 0.189),
        tone(0.349, 0.686, 0.168),
        tone(0.272, 0.534, 0.131),
        a,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> RgbaImage {
        RgbaImage::from_pixel(20, 10, Rgba([10, 200, 30, 255]))
    }

    #[test]
    fn test_none_is_identity() {
        assert_eq!(apply(BorderEffect::None, window()), window());
    }

    #[test]
    fn test_border_adds_a_frame() {
        let framed = apply(BorderEffect::Border, window());

        assert_eq!(framed.dimensions(), (22, 12));
        assert_eq!(*framed.get_pixel(0, 0), BORDER_COLOR);
        assert_eq!(*framed.get_pixel(21, 11), BORDER_COLOR);
        assert_eq!(*framed.get_pixel(1, 1), Rgba([10, 200, 30, 255]));
    }

    #[test]
    fn test_shadow_pads_and_keeps_window_opaque() {
        let shadowed = apply(BorderEffect::Shadow, window());
        let margin = SHADOW_RADIUS * 2;

        assert_eq!(shadowed.dimensions(), (20 + margin * 2, 10 + margin * 2));
        assert_eq!(*shadowed.get_pixel(margin, margin), Rgba([10, 200, 30, 255]));
        assert_eq!(shadowed.get_pixel(0, 0).0[3], 0);

        // Below and right of the window the shadow shows through.
        let under = shadowed.get_pixel(margin + 20 + 1, margin + 10 + 1);
        assert!(under.0[3] > 0);
    }

    #[test]
    fn test_vintage_tones_and_frames() {
        let vintage = apply(BorderEffect::Vintage, window());

        assert_eq!(vintage.dimensions(), (22, 12));
        let [r, g, b, a] = vintage.get_pixel(5, 5).0;
        assert!(r >= g && g >= b);
        assert_eq!(a, 255);
    }
}
