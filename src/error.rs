use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline failures. A failed inference call is deliberately not
/// represented here: the transcription client recovers it into a sentinel
/// result instead of aborting the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not open video {}: {reason}", path.display())]
    MediaOpen { path: PathBuf, reason: String },

    #[error("could not encode sampled frame {index} for transport: {source}")]
    Encoding {
        index: u64,
        #[source]
        source: image::ImageError,
    },

    #[error("could not write transcription: {0}")]
    Io(#[from] std::io::Error),
}
