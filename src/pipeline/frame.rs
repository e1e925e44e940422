use crate::pipeline::face::Region;

/// One decoded raster sampled from a video's timeline.
///
/// Pixels are tightly packed RGB, row-major. `index` is the frame's
/// ordinal in the sampled sequence; `source_frame` is its position in
/// decode order. Owned exclusively by the stage currently processing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB
    pub index: u64,
    pub source_frame: u64,
}

impl Frame {
    /// Panics when `data` is not exactly `width * height * 3` bytes; the
    /// whole pipeline relies on tightly packed RGB rasters.
    pub fn new(width: u32, height: u32, data: Vec<u8>, index: u64, source_frame: u64) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 3) as usize,
            "frame data length must match width * height * 3"
        );
        Self {
            width,
            height,
            data,
            index,
            source_frame,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Single-channel intensity plane, integer BT.601 weights.
    pub fn to_luma(&self) -> Vec<u8> {
        self.data
            .chunks_exact(3)
            .map(|rgb| {
                ((rgb[0] as u32 * 299 + rgb[1] as u32 * 587 + rgb[2] as u32 * 114) / 1000) as u8
            })
            .collect()
    }

    pub fn resize_to(&self, target_width: u32, target_height: u32) -> Frame {
        let img = image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .expect("frame data length matches dimensions");
        let resized = image::imageops::resize(
            &img,
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );

        Frame {
            width: target_width,
            height: target_height,
            data: resized.into_raw(),
            index: self.index,
            source_frame: self.source_frame,
        }
    }

    /// Sub-raster bounded by `region`, clamped to the frame.
    pub fn crop(&self, region: &Region) -> Frame {
        let x0 = region.x.min(self.width);
        let y0 = region.y.min(self.height);
        let x1 = (region.x + region.width).min(self.width);
        let y1 = (region.y + region.height).min(self.height);
        let width = x1 - x0;
        let height = y1 - y0;

        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in y0..y1 {
            let row = ((y * self.width + x0) * 3) as usize;
            data.extend_from_slice(&self.data[row..row + (width * 3) as usize]);
        }

        Frame {
            width,
            height,
            data,
            index: self.index,
            source_frame: self.source_frame,
        }
    }
}
