//! Lip-movement transcription pipeline.
//!
//! Samples frames from a video at a fixed interval, narrows each one to
//! the mouth region when a face is found, encodes the ordered set for
//! transport and asks a multimodal model to read the lips.
//!
//! The external service sits behind [`inference::InferenceBackend`]; the
//! rest of the pipeline is synchronous, single-threaded and free of
//! shared state, so each run is independently repeatable.

pub mod error;
pub mod inference;
pub mod pipeline;

pub use error::PipelineError;
pub use inference::{GeminiClient, InferenceBackend, Transcription};
pub use pipeline::{process_video, PipelineConfig, RunOutcome};
