//! Loop controller.
//!
//! Drives the per-frame state machine: `Running` processes one frame pair,
//! presents the rendered views, advances the rolling frame buffers and polls
//! for a cancel request; `EndOfStream` and `UserExit` are terminal. The two
//! rolling buffers hand off by move each iteration (previous is dropped,
//! current becomes previous, a fresh frame becomes current) so no pixel
//! data is shared between iterations. A pair that has started processing
//! always runs to completion; the cancel poll sits at the iteration
//! boundary.

use anyhow::Result;
use image::RgbImage;
use std::time::Duration;

use crate::display::{Display, KeyPoll, View};
use crate::pipeline::{FrameReport, MotionPipeline};
use crate::render;
use crate::source::{check_minimum_frames, FrameSource, SourceError};
use crate::vision::{Boundary, VisionOps};

/// Loop controller states. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// The source ran out of frames; the final output is held open for
    /// inspection before the run ends.
    EndOfStream,
    /// The operator cancelled; the run ends immediately.
    UserExit,
}

/// What a completed run did.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Terminal state: `EndOfStream` or `UserExit`.
    pub state: LoopState,
    /// Frame pairs processed.
    pub pairs_processed: u64,
    /// Accepted blobs summed over all pairs.
    pub blobs_total: u64,
}

/// Owns the source, the pipeline and the display for one run.
pub struct LoopController<O: VisionOps, S: FrameSource, D: Display> {
    source: S,
    pipeline: MotionPipeline<O>,
    display: D,
    poll_timeout: Duration,
}

impl<O: VisionOps, S: FrameSource, D: Display> LoopController<O, S, D> {
    pub fn new(
        source: S,
        pipeline: MotionPipeline<O>,
        display: D,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            source,
            pipeline,
            display,
            poll_timeout,
        }
    }

    /// Run until end of stream or operator cancel.
    pub fn run(mut self) -> Result<RunSummary> {
        check_minimum_frames(&self.source)?;

        let mut previous = self.read_required_frame()?;
        let mut current = self.read_required_frame()?;

        let mut state = LoopState::Running;
        let mut pairs_processed = 0u64;
        let mut blobs_total = 0u64;

        while state == LoopState::Running {
            let report = self.pipeline.process(&previous, &current);
            pairs_processed += 1;
            blobs_total += report.blobs.len() as u64;

            if report.blobs.is_empty() {
                log::debug!(
                    "pair #{}: {} candidates, no blobs",
                    pairs_processed,
                    report.candidate_count()
                );
            } else {
                log::info!(
                    "pair #{}: {} blob(s) from {} candidate(s)",
                    pairs_processed,
                    report.blobs.len(),
                    report.candidate_count()
                );
            }

            self.present(&current, &report)?;

            // Roll the frame buffers: previous is dropped, current moves up,
            // and the source supplies a fresh current if one remains.
            previous = current;
            match self.source.next_frame()? {
                Some(next) => current = next,
                None => {
                    log::info!("end of video after {} frames", self.source.position());
                    state = LoopState::EndOfStream;
                    break;
                }
            }

            if self.display.wait_key(self.poll_timeout)? == KeyPoll::Cancel {
                log::info!("cancel requested; exiting");
                state = LoopState::UserExit;
            }
        }

        if state == LoopState::EndOfStream {
            self.display.hold()?;
        }

        Ok(RunSummary {
            state,
            pairs_processed,
            blobs_total,
        })
    }

    /// Read a frame the minimum-frame check promised exists.
    fn read_required_frame(&mut self) -> Result<RgbImage> {
        match self.source.next_frame()? {
            Some(frame) => Ok(frame),
            None => Err(SourceError::TooFewFrames.into()),
        }
    }

    fn present(&mut self, current: &RgbImage, report: &FrameReport) -> Result<()> {
        let (w, h) = (current.width(), current.height());

        self.display.show(
            View::Threshold,
            &render::grayscale_view(&report.threshold_map),
        )?;
        self.display.show(
            View::Boundaries,
            &render::boundary_mask(w, h, &report.boundaries),
        )?;

        let hulls: Vec<Boundary> = report.blobs.iter().map(|b| b.hull.clone()).collect();
        self.display
            .show(View::Hulls, &render::boundary_mask(w, h, &hulls))?;

        self.display
            .show(View::Annotated, &render::annotate(current, &report.blobs))?;
        Ok(())
    }
}
