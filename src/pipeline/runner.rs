//! Orchestration: drives sampling, localization, cropping, encoding and
//! the single inference call for one video, in that order.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::PipelineError;
use crate::inference::{transcribe, InferenceBackend, Transcription};
use crate::pipeline::cropper::crop_to_region;
use crate::pipeline::encoder::encode_frames;
use crate::pipeline::face::{locate_mouth, FaceDetector};
use crate::pipeline::frame::Frame;
use crate::pipeline::sampler::{FrameSampler, DEFAULT_FRAME_INTERVAL};

/// Per-run settings. Target resolution and encode quality are fixed in
/// the encoder; only the sampling interval and output destination vary.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub frame_interval: u32,
    pub output_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            output_path: None,
        }
    }
}

/// Terminal state of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The inference call ran. The transcription may be the sentinel
    /// failure branch; that is still a completed run.
    Transcribed(Transcription),
    /// The video produced no frames: nothing was invoked and nothing is
    /// written. Not an error.
    NoFrames,
}

/// Runs the full pipeline for one video.
///
/// Errors abort the run and leave no output file behind; an inference
/// failure does not error, it surfaces as the sentinel transcription.
pub fn process_video(
    path: &Path,
    config: &PipelineConfig,
    detector: &dyn FaceDetector,
    backend: &dyn InferenceBackend,
) -> Result<RunOutcome, PipelineError> {
    info!(
        "sampling frames from {} (every {} decoded frames)",
        path.display(),
        config.frame_interval.max(1)
    );
    let sampler = FrameSampler::open(path, config.frame_interval)?;
    run_stages(sampler, config, detector, backend)
}

fn run_stages(
    frames: impl IntoIterator<Item = Frame>,
    config: &PipelineConfig,
    detector: &dyn FaceDetector,
    backend: &dyn InferenceBackend,
) -> Result<RunOutcome, PipelineError> {
    let frames: Vec<Frame> = frames.into_iter().collect();
    if frames.is_empty() {
        info!("no frames sampled; nothing to transcribe");
        return Ok(RunOutcome::NoFrames);
    }
    info!("sampled {} frames", frames.len());

    info!("locating mouth regions");
    let mouth_frames: Vec<Frame> = frames
        .into_iter()
        .map(|frame| {
            let region = locate_mouth(&frame, detector);
            crop_to_region(frame, region.as_ref())
        })
        .collect();

    info!("encoding {} frames for transport", mouth_frames.len());
    let images = encode_frames(&mouth_frames)?;

    info!("requesting lip-movement transcription");
    let transcription = transcribe(backend, &images);

    if let Some(output) = &config.output_path {
        // The sentinel is persisted like any transcription; only an
        // errored run leaves no file behind.
        fs::write(output, transcription.as_text())?;
        info!("transcription written to {}", output.display());
    }

    Ok(RunOutcome::Transcribed(transcription))
}
