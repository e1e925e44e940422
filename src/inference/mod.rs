//! Transcription client: the single external-service boundary of the
//! pipeline. Everything behind [`InferenceBackend`] is substitutable, so
//! the rest of the crate tests against scripted fakes.

pub mod gemini;

pub use gemini::GeminiClient;

use log::error;
use thiserror::Error;

use crate::pipeline::encoder::EncodedImage;

/// Fixed instruction sent ahead of the ordered image sequence. Kept
/// verbatim from the original system, fallback phrase included.
pub const TRANSCRIPTION_PROMPT: &str = "\
Analise esta sequência de frames mostrando o movimento labial de uma pessoa.
Baseado apenas no movimento dos lábios, transcreva o que a pessoa está dizendo.
Considere a sequência temporal dos movimentos.

Responda APENAS com a transcrição do que foi dito, sem comentários adicionais.
Se não for possível determinar, responda: \"Não foi possível transcrever\".";

/// Sentinel returned in place of a transcription when the inference call
/// could not complete.
pub const TRANSCRIPTION_FAILED: &str = "Erro na transcrição";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One request in, one text payload out. Implementations must not retry,
/// stream or time out on their own; callers needing cancellation wrap
/// this seam.
pub trait InferenceBackend: Send + Sync {
    fn invoke(&self, prompt: &str, images: &[EncodedImage]) -> Result<String, InferenceError>;
}

/// Outcome of one video's inference call. The failure branch is explicit
/// so callers can still tell "service said X" apart from "call failed",
/// even though both render as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    Text(String),
    Failed,
}

impl Transcription {
    /// Text to present or persist; the failure branch renders as the
    /// fixed sentinel.
    pub fn as_text(&self) -> &str {
        match self {
            Transcription::Text(text) => text,
            Transcription::Failed => TRANSCRIPTION_FAILED,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Transcription::Failed)
    }
}

/// Invokes the backend once with the fixed prompt and the ordered image
/// set. Every failure is recovered here: callers get the sentinel branch,
/// never an error.
pub fn transcribe(backend: &dyn InferenceBackend, images: &[EncodedImage]) -> Transcription {
    match backend.invoke(TRANSCRIPTION_PROMPT, images) {
        Ok(text) => Transcription::Text(text),
        Err(e) => {
            error!("inference call failed: {e}");
            Transcription::Failed
        }
    }
}
