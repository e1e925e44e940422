//! Transport encoding: fixed-resolution resize, lossy JPEG compression
//! and base64 so a frame can ride inside an API request body.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{ImageOutputFormat, RgbImage};

use crate::error::PipelineError;
use crate::pipeline::frame::Frame;

pub const TARGET_WIDTH: u32 = 320;
pub const TARGET_HEIGHT: u32 = 240;
pub const JPEG_QUALITY: u8 = 85;
pub const MEDIA_TYPE_JPEG: &str = "image/jpeg";

/// One frame prepared for transport: base64 of the compressed bytes plus
/// the declared media type. Produced once, consumed once.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub media_type: &'static str,
    pub data: String,
}

/// Encodes every frame, preserving order and count.
///
/// The first failure aborts the whole batch: the request indexes images
/// by position, so silently dropping one would misalign the rest.
pub fn encode_frames(frames: &[Frame]) -> Result<Vec<EncodedImage>, PipelineError> {
    frames.iter().map(encode_frame).collect()
}

fn encode_frame(frame: &Frame) -> Result<EncodedImage, PipelineError> {
    let resized = frame.resize_to(TARGET_WIDTH, TARGET_HEIGHT);
    let img = RgbImage::from_raw(TARGET_WIDTH, TARGET_HEIGHT, resized.data)
        .expect("resized frame data length matches target dimensions");

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(|source| PipelineError::Encoding {
            index: frame.index,
            source,
        })?;

    Ok(EncodedImage {
        media_type: MEDIA_TYPE_JPEG,
        data: general_purpose::STANDARD.encode(buffer.into_inner()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(rgb: [u8; 3], index: u64) -> Frame {
        let data: Vec<u8> = rgb.iter().copied().cycle().take(64 * 48 * 3).collect();
        Frame::new(64, 48, data, index, index * 8)
    }

    fn decode(encoded: &EncodedImage) -> image::RgbImage {
        let bytes = general_purpose::STANDARD.decode(&encoded.data).unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgb8()
    }

    fn mean_channels(img: &image::RgbImage) -> [u64; 3] {
        let mut sums = [0u64; 3];
        for pixel in img.pixels() {
            for c in 0..3 {
                sums[c] += pixel.0[c] as u64;
            }
        }
        let count = (img.width() * img.height()) as u64;
        sums.map(|s| s / count)
    }

    #[test]
    fn test_round_trip_solid_frame() {
        let images = encode_frames(&[solid_frame([200, 50, 50], 0)]).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].media_type, "image/jpeg");

        let decoded = decode(&images[0]);
        assert_eq!(decoded.width(), TARGET_WIDTH);
        assert_eq!(decoded.height(), TARGET_HEIGHT);
    }

    #[test]
    fn test_order_and_count_preserved() {
        let frames = vec![
            solid_frame([220, 10, 10], 0),
            solid_frame([10, 220, 10], 1),
            solid_frame([10, 10, 220], 2),
        ];
        let images = encode_frames(&frames).unwrap();
        assert_eq!(images.len(), frames.len());

        // lossy, but each decoded image must still be dominated by the
        // channel of the frame at the same position
        for (i, encoded) in images.iter().enumerate() {
            let means = mean_channels(&decode(encoded));
            let dominant = (0..3).max_by_key(|&c| means[c]).unwrap();
            assert_eq!(dominant, i, "image {i} out of order");
            assert!(means[i] > 150);
        }
    }

    #[test]
    fn test_empty_input_encodes_to_empty_output() {
        assert!(encode_frames(&[]).unwrap().is_empty());
    }
}
