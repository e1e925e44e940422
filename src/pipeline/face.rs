//! Face and mouth localization.
//!
//! The locator converts a frame to a single-channel intensity plane, asks
//! a [`FaceDetector`] for candidate face rectangles and derives the mouth
//! rectangle from the first candidate. "First wins" is a deliberate,
//! reproducible tie-break: candidates are never re-ranked by size or
//! score.

use crate::pipeline::frame::Frame;

/// Axis-aligned rectangle in frame-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Mouth sub-rectangle of a face: same x and width, y offset by half
    /// the face height, height halved (integer division).
    pub fn mouth_region(&self) -> Region {
        Region {
            x: self.x,
            y: self.y + self.height / 2,
            width: self.width,
            height: self.height / 2,
        }
    }

    fn overlaps(&self, other: &Region) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Face detection seam.
///
/// `luma` is a row-major intensity plane of `width * height` bytes.
/// Implementations must report candidates in a deterministic order;
/// callers take the first one.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, luma: &[u8], width: u32, height: u32) -> Vec<Region>;
}

/// Mouth region for `frame`, or `None` when no face is found.
///
/// Pure: no state is shared across calls.
pub fn locate_mouth(frame: &Frame, detector: &dyn FaceDetector) -> Option<Region> {
    let luma = frame.to_luma();
    let faces = detector.detect(&luma, frame.width, frame.height);
    faces.first().map(|face| face.mouth_region())
}

/// Lightweight sliding-window face detector over the intensity plane.
///
/// A window qualifies when it is clearly brighter than the frame overall
/// and shows the vertical structure of a lit face: forehead and cheek
/// bands brighter than the eye band between them. Windows are scanned
/// coarse scales first, row-major, and a window overlapping an already
/// accepted candidate is skipped, so the candidate order is stable.
pub struct LumaFaceDetector {
    brightness_margin: u32,
    band_margin: u32,
}

impl LumaFaceDetector {
    pub fn new() -> Self {
        Self {
            brightness_margin: 20,
            band_margin: 15,
        }
    }

    fn band_mean(luma: &[u8], stride: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u32 {
        let mut sum = 0u64;
        let mut count = 0u64;
        for y in y0..y1 {
            let row = y * stride;
            for x in x0..x1 {
                sum += luma[row + x] as u64;
                count += 1;
            }
        }
        if count == 0 {
            0
        } else {
            (sum / count) as u32
        }
    }

    fn is_face(&self, luma: &[u8], stride: usize, window: &Region, frame_mean: u32) -> bool {
        let x0 = window.x as usize;
        let y0 = window.y as usize;
        let x1 = x0 + window.width as usize;
        let y1 = y0 + window.height as usize;

        let inner = Self::band_mean(luma, stride, x0, y0, x1, y1);
        if inner <= frame_mean + self.brightness_margin {
            return false;
        }

        let quarter = window.height as usize / 4;
        let forehead = Self::band_mean(luma, stride, x0, y0, x1, y0 + quarter);
        let eyes = Self::band_mean(luma, stride, x0, y0 + quarter, x1, y0 + 2 * quarter);
        let cheeks = Self::band_mean(luma, stride, x0, y0 + 2 * quarter, x1, y0 + 3 * quarter);

        forehead > eyes + self.band_margin && cheeks > eyes + self.band_margin
    }
}

impl Default for LumaFaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for LumaFaceDetector {
    fn detect(&self, luma: &[u8], width: u32, height: u32) -> Vec<Region> {
        let w = width as usize;
        let h = height as usize;
        if w < 48 || h < 48 || luma.len() < w * h {
            return Vec::new();
        }

        let frame_mean = Self::band_mean(luma, w, 0, 0, w, h);
        let min_dim = w.min(h);
        let mut found: Vec<Region> = Vec::new();

        for denom in [2usize, 3, 4] {
            let win = min_dim / denom;
            if win < 32 {
                continue;
            }
            let step = (win / 4).max(1);

            let mut y = 0;
            while y + win <= h {
                let mut x = 0;
                while x + win <= w {
                    let candidate = Region::new(x as u32, y as u32, win as u32, win as u32);
                    if !found.iter().any(|r| r.overlaps(&candidate))
                        && self.is_face(luma, w, &candidate, frame_mean)
                    {
                        found.push(candidate);
                    }
                    x += step;
                }
                y += step;
            }
        }

        found
    }
}

/// Scripted detector for tests.
pub struct MockFaceDetector {
    faces: Vec<Region>,
}

impl MockFaceDetector {
    /// Never reports a face.
    pub fn never() -> Self {
        Self { faces: Vec::new() }
    }

    pub fn with_faces(faces: Vec<Region>) -> Self {
        Self { faces }
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&self, _luma: &[u8], _width: u32, _height: u32) -> Vec<Region> {
        self.faces.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(width: u32, height: u32, value: u8) -> Frame {
        let data = vec![value; (width * height * 3) as usize];
        Frame::new(width, height, data, 0, 0)
    }

    /// Dark background with a bright face-like square: forehead and
    /// cheeks bright, an eye stripe darker in between.
    fn face_frame() -> Frame {
        let mut data = vec![40u8; 128 * 128 * 3];
        for y in 32..96usize {
            for x in 32..96usize {
                let value = if (48..64).contains(&y) { 120 } else { 200 };
                let idx = (y * 128 + x) * 3;
                data[idx] = value;
                data[idx + 1] = value;
                data[idx + 2] = value;
            }
        }
        Frame::new(128, 128, data, 0, 0)
    }

    #[test]
    fn test_mouth_region_is_lower_face_half() {
        let face = Region::new(4, 6, 10, 9);
        let mouth = face.mouth_region();

        assert_eq!(mouth, Region::new(4, 10, 10, 4));
        assert!(mouth.y >= face.y + face.height / 2);
        assert_eq!(mouth.height, face.height / 2);
        assert!(mouth.y + mouth.height <= face.y + face.height);
    }

    #[test]
    fn test_locate_mouth_absent_without_faces() {
        let frame = gray_frame(64, 64, 128);
        let detector = MockFaceDetector::never();
        assert_eq!(locate_mouth(&frame, &detector), None);
    }

    #[test]
    fn test_locate_mouth_first_candidate_wins() {
        let frame = gray_frame(64, 64, 128);
        let detector = MockFaceDetector::with_faces(vec![
            Region::new(10, 10, 40, 40),
            Region::new(50, 50, 10, 10),
        ]);

        let mouth = locate_mouth(&frame, &detector);
        assert_eq!(mouth, Some(Region::new(10, 30, 40, 20)));
    }

    #[test]
    fn test_luma_detector_uniform_frame_has_no_faces() {
        let detector = LumaFaceDetector::new();
        let frame = gray_frame(128, 128, 128);
        let candidates = detector.detect(&frame.to_luma(), 128, 128);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_luma_detector_finds_synthetic_face() {
        let detector = LumaFaceDetector::new();
        let frame = face_frame();
        let candidates = detector.detect(&frame.to_luma(), 128, 128);

        assert!(!candidates.is_empty());
        // the first candidate must overlap the painted face square
        let painted = Region::new(32, 32, 64, 64);
        assert!(candidates[0].overlaps(&painted));
        // every candidate stays within the frame
        for region in &candidates {
            assert!(region.x + region.width <= 128);
            assert!(region.y + region.height <= 128);
        }
    }

    #[test]
    fn test_luma_detector_skips_tiny_frames() {
        let detector = LumaFaceDetector::new();
        let frame = gray_frame(32, 32, 200);
        assert!(detector.detect(&frame.to_luma(), 32, 32).is_empty());
    }
}
