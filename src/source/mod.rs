//! Sequential frame sources.
//!
//! A source delivers decoded RGB frames one at a time:
//! - `FileSource`: local video files (feature: source-ffmpeg) and `stub://`
//!   synthetic scenes
//! - `MemorySource`: a fixed in-memory frame list (tests, embedding)
//!
//! Every source exposes the same contract: a frame count, the current read
//! position, and a sequential read that yields `Ok(None)` at end of stream.
//! Open failures are typed so callers can map them to distinct process exit
//! codes; once a source has opened successfully, reads are expected to
//! succeed until the stream ends.

use anyhow::Result;
use image::RgbImage;

pub mod file;
#[cfg(feature = "source-ffmpeg")]
pub(crate) mod file_ffmpeg;
pub mod memory;

pub use file::{FileConfig, FileSource};
pub use memory::MemorySource;

/// Sequential access to the frames of a video stream.
pub trait FrameSource {
    /// Total number of frames in the stream, when known up front.
    fn frame_count(&self) -> u64;

    /// Zero-based index of the next frame `next_frame` would return.
    fn position(&self) -> u64;

    /// Read the next frame. `Ok(None)` signals end of stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Fatal conditions detected while opening a source.
///
/// Both are terminal for the whole run; the binary maps them to distinct
/// process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not be opened at all.
    Unavailable,
    /// The source opened but holds fewer than two frames, so there is no
    /// frame pair to difference.
    TooFewFrames,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable => write!(f, "error reading video source"),
            SourceError::TooFewFrames => {
                write!(f, "video source must have at least two frames")
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Require at least two frames before the loop controller starts.
pub fn check_minimum_frames(source: &dyn FrameSource) -> Result<()> {
    if source.frame_count() < 2 {
        return Err(SourceError::TooFewFrames.into());
    }
    Ok(())
}
