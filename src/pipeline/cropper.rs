use crate::pipeline::face::Region;
use crate::pipeline::frame::Frame;

/// Crops `frame` to `region` when one is present.
///
/// A missing region never drops the frame: the full frame passes through
/// unchanged, so the encoded image set keeps exactly one entry per
/// sampled frame. Callers guarantee a present region was derived from
/// this frame's dimensions; out-of-range values are clamped.
pub fn crop_to_region(frame: Frame, region: Option<&Region>) -> Frame {
    match region {
        Some(region) => frame.crop(region),
        None => frame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(width: u32, height: u32, value: u8) -> Frame {
        let data = vec![value; (width * height * 3) as usize];
        Frame::new(width, height, data, 1, 8)
    }

    #[test]
    fn test_absent_region_is_identity() {
        let frame = gray_frame(16, 12, 77);
        let passed = crop_to_region(frame.clone(), None);
        assert_eq!(passed, frame);
    }

    #[test]
    fn test_present_region_crops() {
        let frame = gray_frame(16, 12, 77);
        let cropped = crop_to_region(frame, Some(&Region::new(2, 6, 8, 6)));

        assert_eq!(cropped.width, 8);
        assert_eq!(cropped.height, 6);
        assert_eq!(cropped.index, 1);
        assert!(cropped.data.iter().all(|&v| v == 77));
    }
}
