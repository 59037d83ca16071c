//! Local file frame source using FFmpeg.
//!
//! Frames are decoded in-memory and scaled to packed RGB24. The container's
//! declared frame count is used when present, with a duration x fps estimate
//! as fallback.

use anyhow::{Context, Result};
use ffmpeg_next as ffmpeg;
use image::RgbImage;

use super::file::FileConfig;
use super::SourceError;

pub(crate) struct FfmpegFileSource {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    frame_count: u64,
    position: u64,
    drained: bool,
}

impl FfmpegFileSource {
    pub(crate) fn open(config: FileConfig) -> Result<Self> {
        ffmpeg::init().context("initialize ffmpeg")?;
        let input = ffmpeg::format::input(&config.path).map_err(|e| {
            anyhow::Error::new(SourceError::Unavailable)
                .context(format!("failed to open '{}' with ffmpeg: {}", config.path, e))
        })?;
        let input_stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| {
                anyhow::Error::new(SourceError::Unavailable).context("file has no video track")
            })?;
        let stream_index = input_stream.index();
        let frame_count = declared_frame_count(&input_stream);
        let context = ffmpeg::codec::context::Context::from_parameters(input_stream.parameters())
            .context("load video decoder parameters")?;
        let decoder = context
            .decoder()
            .video()
            .context("open ffmpeg video decoder")?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::util::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .context("create ffmpeg scaler")?;

        log::info!(
            "FileSource: opened {} (ffmpeg, {} frames declared)",
            config.path,
            frame_count
        );

        Ok(Self {
            input,
            stream_index,
            decoder,
            scaler,
            frame_count,
            position: 0,
            drained: false,
        })
    }

    pub(crate) fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut decoded = ffmpeg::frame::Video::empty();

        loop {
            if let Some(frame) = self.receive_one(&mut decoded)? {
                self.position += 1;
                return Ok(Some(frame));
            }
            if self.drained {
                return Ok(None);
            }

            // Feed the decoder the next video packet, or flush it when the
            // demuxer runs dry.
            let mut fed = false;
            for (stream, packet) in self.input.packets() {
                if stream.index() != self.stream_index {
                    continue;
                }
                self.decoder
                    .send_packet(&packet)
                    .context("send packet to ffmpeg decoder")?;
                fed = true;
                break;
            }
            if !fed {
                self.decoder.send_eof().ok();
                self.drained = true;
            }
        }
    }

    fn receive_one(&mut self, decoded: &mut ffmpeg::frame::Video) -> Result<Option<RgbImage>> {
        if self.decoder.receive_frame(decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .context("scale frame to RGB")?;
        let (pixels, width, height) = frame_to_pixels(&rgb_frame)?;
        let image = RgbImage::from_raw(width, height, pixels)
            .context("ffmpeg frame has inconsistent dimensions")?;
        Ok(Some(image))
    }
}

fn declared_frame_count(stream: &ffmpeg::format::stream::Stream<'_>) -> u64 {
    let nb = stream.frames();
    if nb > 0 {
        return nb as u64;
    }
    // Some containers omit nb_frames; estimate from duration and frame rate.
    let dur = stream.duration();
    let tb = stream.time_base();
    let fps = stream.avg_frame_rate();
    if dur > 0 && tb.denominator() > 0 && fps.numerator() > 0 && fps.denominator() > 0 {
        let seconds = dur as f64 * tb.numerator() as f64 / tb.denominator() as f64;
        let fps_f = fps.numerator() as f64 / fps.denominator() as f64;
        return (seconds * fps_f).round() as u64;
    }
    0
}

fn frame_to_pixels(frame: &ffmpeg::frame::Video) -> Result<(Vec<u8>, u32, u32)> {
    let width = frame.width();
    let height = frame.height();
    let row_bytes = (width as usize) * 3;
    let stride = frame.stride(0) as usize;
    let data = frame.data(0);

    if stride == row_bytes {
        return Ok((data.to_vec(), width, height));
    }

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        let end = start + row_bytes;
        pixels.extend_from_slice(
            data.get(start..end)
                .context("ffmpeg frame row is out of bounds")?,
        );
    }

    Ok((pixels, width, height))
}
