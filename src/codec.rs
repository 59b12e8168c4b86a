//! Image file decode/encode boundary.
//!
//! The filter library never looks at file bytes; it only needs interleaved
//! 8-bit samples. [`Codec`] is the seam, [`ImageCodec`] the default
//! implementation on top of the `image` crate.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::buffer::PixelBuffer;
use crate::error::{EnhanceError, EnhanceResult};

/// Highest accepted encoder quality.
pub const MAX_QUALITY: u8 = 100;

/// Turns files into [`PixelBuffer`]s and back.
pub trait Codec: Sync {
    /// Read `path` as 1, 3, or 4 channel 8-bit samples.
    fn decode(&self, path: &Path) -> EnhanceResult<PixelBuffer>;

    /// Write `buffer` to `path`; `quality` (0-100) is a lossy-compression hint.
    fn encode(&self, path: &Path, buffer: &PixelBuffer, quality: u8) -> EnhanceResult<()>;
}

/// [`Codec`] backed by the `image` crate; the output format follows the
/// output file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    fn to_pixel_buffer(path: &Path, img: DynamicImage) -> EnhanceResult<PixelBuffer> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let color = img.color();
        let (channels, data) = if color.has_alpha() {
            (4, img.into_rgba8().into_raw())
        } else if color.channel_count() == 1 {
            (1, img.into_luma8().into_raw())
        } else {
            (3, img.into_rgb8().into_raw())
        };
        PixelBuffer::from_raw(width, height, channels, data).map_err(|e| {
            EnhanceError::invalid_buffer(format!("'{}': {e}", path.display()))
        })
    }
}

fn extended_color(channels: usize) -> ExtendedColorType {
    match channels {
        1 => ColorType::L8.into(),
        4 => ColorType::Rgba8.into(),
        _ => ColorType::Rgb8.into(),
    }
}

impl Codec for ImageCodec {
    fn decode(&self, path: &Path) -> EnhanceResult<PixelBuffer> {
        let img = image::ImageReader::open(path)
            .map_err(|e| EnhanceError::Decode {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(e),
            })?
            .with_guessed_format()
            .map_err(|e| EnhanceError::Decode {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(e),
            })?
            .decode()
            .map_err(|source| EnhanceError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        Self::to_pixel_buffer(path, img)
    }

    fn encode(&self, path: &Path, buffer: &PixelBuffer, quality: u8) -> EnhanceResult<()> {
        if quality > MAX_QUALITY {
            return Err(EnhanceError::invalid_parameter(format!(
                "quality must be 0-{MAX_QUALITY}, got {quality}"
            )));
        }
        let encode_err = |source: image::ImageError| EnhanceError::Encode {
            path: path.to_path_buf(),
            source,
        };

        let format = ImageFormat::from_path(path).map_err(encode_err)?;
        let (width, height) = (buffer.width() as u32, buffer.height() as u32);
        let color = extended_color(buffer.channels());
        let owned;
        let data = match buffer.as_slice() {
            Some(slice) => slice,
            None => {
                owned = buffer.clone().into_raw();
                &owned
            }
        };

        if format == ImageFormat::Jpeg {
            let file = File::create(path).map_err(|source| EnhanceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            // JPEG has no quality 0; the encoder expects 1-100
            JpegEncoder::new_with_quality(BufWriter::new(file), quality.max(1))
                .write_image(data, width, height, color)
                .map_err(encode_err)
        } else {
            image::save_buffer_with_format(path, data, width, height, color, format).map_err(encode_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip_keeps_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.png");
        let buf = PixelBuffer::from_raw(4, 3, 3, (0..36).map(|v| (v * 7) as u8).collect()).unwrap();

        ImageCodec.encode(&path, &buf, 100).unwrap();
        let decoded = ImageCodec.decode(&path).unwrap();

        assert_eq!(decoded, buf);
    }

    #[test]
    fn test_decode_gray_and_rgba_channel_counts() {
        let dir = tempfile::tempdir().unwrap();
        let gray = dir.path().join("gray.png");
        let rgba = dir.path().join("rgba.png");
        image::GrayImage::from_pixel(2, 2, image::Luma([9])).save(&gray).unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4])).save(&rgba).unwrap();

        assert_eq!(ImageCodec.decode(&gray).unwrap().channels(), 1);
        let decoded = ImageCodec.decode(&rgba).unwrap();
        assert_eq!(decoded.channels(), 4);
        assert_eq!(decoded.sample(1, 1, 3), 4);
    }

    #[test]
    fn test_decode_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = ImageCodec.decode(&path).unwrap_err();

        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_encode_jpeg_with_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let buf = PixelBuffer::filled(8, 8, 3, 128).unwrap();

        ImageCodec.encode(&path, &buf, 90).unwrap();
        let decoded = ImageCodec.decode(&path).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (8, 8));
        assert!((decoded.sample(4, 4, 0) as i32 - 128).abs() <= 2);
    }

    #[test]
    fn test_encode_rejects_unknown_extension_and_quality() {
        let dir = tempfile::tempdir().unwrap();
        let buf = PixelBuffer::filled(1, 1, 1, 0).unwrap();

        let err = ImageCodec.encode(&dir.path().join("out.nope"), &buf, 100).unwrap_err();
        assert_eq!(err.kind(), "encode");

        let err = ImageCodec.encode(&dir.path().join("out.png"), &buf, 101).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
    }
}
