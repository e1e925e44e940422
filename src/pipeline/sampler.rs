//! Frame sampling.
//!
//! The container is probed with `ffprobe` and decoded by an `ffmpeg`
//! child process writing tightly packed rgb24 frames to a pipe. The
//! sampling logic itself is generic over any byte stream so it can be
//! tested without a decoder.

use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use log::debug;
use serde::Deserialize;

use crate::error::PipelineError;
use crate::pipeline::frame::Frame;

pub const DEFAULT_FRAME_INTERVAL: u32 = 8;

const BYTES_PER_PIXEL: usize = 3;

/// Yields every `interval`-th rgb24 frame from a raw byte stream, in
/// decode order. Frames carry their sampled ordinal and decode position.
/// A short read ends the stream; it is never an error mid-iteration.
pub(crate) struct RawFrameReader<R: Read> {
    reader: R,
    width: u32,
    height: u32,
    interval: u64,
    decode_pos: u64,
    sample_idx: u64,
    finished: bool,
}

impl<R: Read> RawFrameReader<R> {
    /// Intervals below 1 are clamped to 1.
    pub(crate) fn new(reader: R, width: u32, height: u32, interval: u32) -> Self {
        Self {
            reader,
            width,
            height,
            interval: interval.max(1) as u64,
            decode_pos: 0,
            sample_idx: 0,
            finished: false,
        }
    }

    fn read_frame(&mut self) -> Option<Vec<u8>> {
        let len = self.width as usize * self.height as usize * BYTES_PER_PIXEL;
        let mut buf = vec![0u8; len];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Some(buf),
            Err(_) => None,
        }
    }
}

impl<R: Read> Iterator for RawFrameReader<R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }
        loop {
            let Some(data) = self.read_frame() else {
                self.finished = true;
                return None;
            };
            let pos = self.decode_pos;
            self.decode_pos += 1;
            if pos % self.interval == 0 {
                let index = self.sample_idx;
                self.sample_idx += 1;
                return Some(Frame::new(self.width, self.height, data, index, pos));
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

pub(crate) fn probe_command(path: &Path) -> Command {
    let mut cmd = Command::new("ffprobe");
    cmd.arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("v:0")
        .arg("-show_entries")
        .arg("stream=width,height")
        .arg("-of")
        .arg("json")
        .arg(path);
    cmd.stdout(Stdio::piped()).stderr(Stdio::null());
    cmd
}

pub(crate) fn decode_command(path: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-v")
        .arg("error")
        .arg("-i")
        .arg(path)
        .arg("-f")
        .arg("rawvideo")
        .arg("-pix_fmt")
        .arg("rgb24")
        .arg("pipe:1");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    cmd
}

fn media_open(path: &Path, reason: String) -> PipelineError {
    PipelineError::MediaOpen {
        path: path.to_path_buf(),
        reason,
    }
}

fn probe_dimensions(path: &Path) -> Result<(u32, u32), PipelineError> {
    let output = probe_command(path)
        .output()
        .map_err(|e| media_open(path, format!("ffprobe: {e}")))?;
    if !output.status.success() {
        return Err(media_open(
            path,
            format!("ffprobe exited with {}", output.status),
        ));
    }
    parse_probe_dimensions(path, &output.stdout)
}

fn parse_probe_dimensions(path: &Path, stdout: &[u8]) -> Result<(u32, u32), PipelineError> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| media_open(path, format!("ffprobe output: {e}")))?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| media_open(path, "no decodable video stream".to_string()))?;

    match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(media_open(
            path,
            "video stream reports no dimensions".to_string(),
        )),
    }
}

/// Lazy, finite, non-restartable frame source for one video.
///
/// Holds the decoder child process for the duration of iteration and
/// releases it on drop, including when iteration is abandoned early.
pub struct FrameSampler {
    child: Child,
    frames: RawFrameReader<ChildStdout>,
}

impl FrameSampler {
    pub fn open(path: &Path, interval: u32) -> Result<Self, PipelineError> {
        let (width, height) = probe_dimensions(path)?;
        debug!("probed {}: {}x{}", path.display(), width, height);

        let mut child = decode_command(path)
            .spawn()
            .map_err(|e| PipelineError::MediaOpen {
                path: path.to_path_buf(),
                reason: format!("ffmpeg: {e}"),
            })?;
        let stdout = child.stdout.take().expect("decoder stdout was piped");

        Ok(Self {
            child,
            frames: RawFrameReader::new(stdout, width, height, interval),
        })
    }
}

impl Iterator for FrameSampler {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.frames.next()
    }
}

impl Drop for FrameSampler {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
