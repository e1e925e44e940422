//! Video-to-evidence pipeline: frame sampling, mouth localization,
//! cropping and transport encoding, driven stage by stage by the runner.

pub mod cropper;
pub mod encoder;
pub mod face;
pub mod frame;
pub mod runner;
pub mod sampler;

pub use cropper::crop_to_region;
pub use encoder::{encode_frames, EncodedImage};
pub use face::{locate_mouth, FaceDetector, LumaFaceDetector, MockFaceDetector, Region};
pub use frame::Frame;
pub use runner::{process_video, PipelineConfig, RunOutcome};
pub use sampler::{FrameSampler, DEFAULT_FRAME_INTERVAL};
