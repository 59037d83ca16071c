//! Local file frame source.
//!
//! `FileSource` reads frames from a local video file, decoded in-memory via
//! FFmpeg when the `source-ffmpeg` feature is enabled. Paths with the
//! `stub://` scheme select a deterministic synthetic scene instead, which is
//! what the test suite and the default configuration use.

use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};

#[cfg(feature = "source-ffmpeg")]
use super::file_ffmpeg::FfmpegFileSource;
use super::{FrameSource, SourceError};

/// Configuration for a local file source.
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path (e.g. "/var/lib/motionwatch/lot.mp4") or `stub://` handles.
    pub path: String,
    /// Target frame rate; informational for file playback.
    pub target_fps: u32,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            target_fps: 25,
        }
    }
}

/// Local file frame source.
pub struct FileSource {
    backend: FileBackend,
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource").finish_non_exhaustive()
    }
}

enum FileBackend {
    Synthetic(SyntheticScene),
    #[cfg(feature = "source-ffmpeg")]
    Ffmpeg(FfmpegFileSource),
}

impl FileSource {
    /// Open a source for `config.path`. This is the open-check: a path that
    /// cannot be opened yields [`SourceError::Unavailable`].
    pub fn open(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(SourceError::Unavailable)
                .context("file sources only support local paths (no URL schemes)"));
        }
        if config.path.starts_with("stub://") {
            return Ok(Self {
                backend: FileBackend::Synthetic(SyntheticScene::new(config)),
            });
        }
        #[cfg(feature = "source-ffmpeg")]
        {
            Ok(Self {
                backend: FileBackend::Ffmpeg(FfmpegFileSource::open(config)?),
            })
        }
        #[cfg(not(feature = "source-ffmpeg"))]
        {
            Err(anyhow!(SourceError::Unavailable)
                .context("reading video files requires the source-ffmpeg feature"))
        }
    }
}

impl FrameSource for FileSource {
    fn frame_count(&self) -> u64 {
        match &self.backend {
            FileBackend::Synthetic(scene) => scene.frame_count(),
            #[cfg(feature = "source-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.frame_count(),
        }
    }

    fn position(&self) -> u64 {
        match &self.backend {
            FileBackend::Synthetic(scene) => scene.position(),
            #[cfg(feature = "source-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.position(),
        }
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        match &mut self.backend {
            FileBackend::Synthetic(scene) => scene.next_frame(),
            #[cfg(feature = "source-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.next_frame(),
        }
    }
}

// ----------------------------------------------------------------------------
// Synthetic scene (stub://)
// ----------------------------------------------------------------------------

const SYNTHETIC_WIDTH: u32 = 640;
const SYNTHETIC_HEIGHT: u32 = 480;
const SYNTHETIC_FRAMES: u64 = 240;
const SQUARE_SIDE: u32 = 48;
const SQUARE_STEP: u32 = 4;
const SQUARE_CELL: u32 = 4;

/// Deterministic scene: a checkerboard-textured square marching across a
/// flat background. The texture rides along with the square, so each step
/// changes the whole covered region, not just the leading and trailing
/// edges, and the difference pipeline sees one well-formed blob per pair.
struct SyntheticScene {
    position: u64,
}

impl SyntheticScene {
    fn new(config: FileConfig) -> Self {
        log::info!("FileSource: opened {} (synthetic)", config.path);
        Self { position: 0 }
    }

    fn frame_count(&self) -> u64 {
        SYNTHETIC_FRAMES
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.position >= SYNTHETIC_FRAMES {
            return Ok(None);
        }
        let frame = self.render(self.position);
        self.position += 1;
        Ok(Some(frame))
    }

    fn render(&self, index: u64) -> RgbImage {
        let travel = SYNTHETIC_WIDTH - SQUARE_SIDE;
        let x0 = ((index as u32 * SQUARE_STEP) % travel.max(1)) as i64;
        let y0 = ((SYNTHETIC_HEIGHT - SQUARE_SIDE) / 2) as i64;

        RgbImage::from_fn(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT, |x, y| {
            let inside = (x as i64) >= x0
                && (x as i64) < x0 + SQUARE_SIDE as i64
                && (y as i64) >= y0
                && (y as i64) < y0 + SQUARE_SIDE as i64;
            if inside {
                let cell_x = ((x as i64 - x0) as u32) / SQUARE_CELL;
                let cell_y = ((y as i64 - y0) as u32) / SQUARE_CELL;
                if (cell_x + cell_y) % 2 == 0 {
                    Rgb([220, 220, 220])
                } else {
                    Rgb([70, 70, 70])
                }
            } else {
                Rgb([24, 24, 24])
            }
        })
    }
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.starts_with("stub://") {
        return true;
    }
    !path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_remote_urls_and_empty_paths() {
        for path in ["", "   ", "rtsp://cam-1/stream", "https://example.com/a.mp4"] {
            let err = FileSource::open(FileConfig {
                path: path.to_string(),
                ..FileConfig::default()
            })
            .unwrap_err();
            assert_eq!(
                err.downcast_ref::<SourceError>(),
                Some(&SourceError::Unavailable)
            );
        }
    }

    #[test]
    fn synthetic_scene_is_deterministic_and_bounded() {
        let mut a = FileSource::open(FileConfig {
            path: "stub://scene".to_string(),
            ..FileConfig::default()
        })
        .unwrap();
        let mut b = FileSource::open(FileConfig {
            path: "stub://scene".to_string(),
            ..FileConfig::default()
        })
        .unwrap();

        assert!(a.frame_count() >= 2);
        assert_eq!(a.position(), 0);

        let fa = a.next_frame().unwrap().expect("first frame");
        let fb = b.next_frame().unwrap().expect("first frame");
        assert_eq!(fa.as_raw(), fb.as_raw());
        assert_eq!(a.position(), 1);
    }

    #[test]
    fn synthetic_scene_ends_cleanly() {
        let mut source = FileSource::open(FileConfig {
            path: "stub://scene".to_string(),
            ..FileConfig::default()
        })
        .unwrap();
        for _ in 0..source.frame_count() {
            assert!(source.next_frame().unwrap().is_some());
        }
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn consecutive_synthetic_frames_differ() {
        let mut source = FileSource::open(FileConfig {
            path: "stub://scene".to_string(),
            ..FileConfig::default()
        })
        .unwrap();
        let first = source.next_frame().unwrap().unwrap();
        let second = source.next_frame().unwrap().unwrap();
        assert_ne!(first.as_raw(), second.as_raw());
    }
}
