//! Decoded raster images and packed ARGB pixel access.
//!
//! Every raster the engine handles is an 8-bit RGBA buffer. Tiles arrive in
//! whatever format the tile server uses (paletted PNG, opaque JPEG, ...) and
//! are normalized once, at decode time, so that color matching and alpha
//! blending never see a format without an alpha channel.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

/// The decoded bitmap type passed between engine components.
pub type RasterImage = RgbaImage;

/// Decodes encoded image bytes (PNG, JPEG, ...) into an RGBA raster.
///
/// Opaque source formats get a fully opaque alpha channel.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, image::ImageError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgba8())
}

/// Encodes a raster as PNG bytes.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Packs an RGBA pixel as a 32-bit ARGB value (`0xAARRGGBB`).
#[inline]
pub fn argb(pixel: &Rgba<u8>) -> u32 {
    let [r, g, b, a] = pixel.0;
    u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)
}

/// Unpacks a 32-bit ARGB value into an RGBA pixel.
#[inline]
pub fn from_argb(color: u32) -> Rgba<u8> {
    let [a, r, g, b] = color.to_be_bytes();
    Rgba([r, g, b, a])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    #[test]
    fn test_argb_packing() {
        assert_eq!(argb(&Rgba([0xFF, 0x00, 0x00, 0xFF])), 0xFFFF0000);
        assert_eq!(argb(&Rgba([0x12, 0x34, 0x56, 0x78])), 0x78123456);
    }

    #[test]
    fn test_from_argb_inverts_argb() {
        let pixel = Rgba([10, 20, 30, 40]);
        assert_eq!(from_argb(argb(&pixel)), pixel);
    }

    #[test]
    fn test_decode_opaque_png_gets_alpha() {
        let rgb = RgbImage::from_pixel(4, 3, image::Rgb([0, 255, 0]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();

        let raster = decode(bytes.get_ref()).unwrap();
        assert_eq!(raster.dimensions(), (4, 3));
        assert_eq!(argb(raster.get_pixel(2, 1)), 0xFF00FF00);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(b"definitely not an image").is_err());
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_encode_png_roundtrip_dimensions() {
        let image = RgbaImage::from_pixel(7, 5, Rgba([1, 2, 3, 128]));
        let png = encode_png(&image).unwrap();

        assert_eq!(&png[1..4], b"PNG");
        let decoded = decode(&png).unwrap();
        assert_eq!(decoded, image);
    }
}
