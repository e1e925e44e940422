use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use lipread::inference::gemini::DEFAULT_MODEL;
use lipread::pipeline::{LumaFaceDetector, DEFAULT_FRAME_INTERVAL};
use lipread::{process_video, GeminiClient, PipelineConfig, RunOutcome};

/// Transcribes lip movement from a video using the Gemini API.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Input video file
    video_path: PathBuf,

    /// Google Gemini API key
    #[arg(long, value_name = "KEY")]
    api_key: String,

    /// Write the transcription to this file
    #[arg(long, value_name = "FILE_PATH")]
    output: Option<PathBuf>,

    /// Sample every Nth decoded frame
    #[arg(long, default_value_t = DEFAULT_FRAME_INTERVAL, value_parser = clap::value_parser!(u32).range(1..))]
    interval: u32,

    /// Gemini model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = CliArgs::parse();

    if !args.video_path.exists() {
        return Err(format!("video file {} not found", args.video_path.display()).into());
    }

    // Collaborators are built once and injected, so the pipeline itself
    // never touches process-global configuration.
    let detector = LumaFaceDetector::new();
    let backend = GeminiClient::with_model(&args.api_key, &args.model);
    let config = PipelineConfig {
        frame_interval: args.interval,
        output_path: args.output,
    };

    match process_video(&args.video_path, &config, &detector, &backend)? {
        RunOutcome::Transcribed(transcription) => {
            println!("{}", "=".repeat(50));
            println!("TRANSCRIÇÃO COMPLETA:");
            println!("{}", "=".repeat(50));
            println!("{}", transcription.as_text());
            println!("{}", "=".repeat(50));
        }
        RunOutcome::NoFrames => {
            println!("Nenhum frame extraído do vídeo.");
        }
    }

    Ok(())
}
