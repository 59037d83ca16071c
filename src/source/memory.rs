//! In-memory frame source.
//!
//! Serves a fixed list of frames in order. The integration tests use this to
//! script exact frame content; it is also the natural adapter for embedding
//! the detector behind a caller-owned decode loop.

use anyhow::Result;
use image::RgbImage;

use super::FrameSource;

/// Frame source backed by a pre-built frame list.
pub struct MemorySource {
    frames: Vec<RgbImage>,
    position: u64,
}

impl MemorySource {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames,
            position: 0,
        }
    }
}

impl FrameSource for MemorySource {
    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(frame) = self.frames.get(self.position as usize) else {
            return Ok(None);
        };
        let frame = frame.clone();
        self.position += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_frames_in_order_then_ends() {
        let frames = vec![
            RgbImage::from_pixel(4, 4, image::Rgb([1, 1, 1])),
            RgbImage::from_pixel(4, 4, image::Rgb([2, 2, 2])),
        ];
        let mut source = MemorySource::new(frames);

        assert_eq!(source.frame_count(), 2);
        assert_eq!(source.position(), 0);

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.get_pixel(0, 0).0, [1, 1, 1]);
        assert_eq!(source.position(), 1);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.get_pixel(0, 0).0, [2, 2, 2]);

        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.position(), 2);
    }
}
