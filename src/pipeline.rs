//! Per-frame-pair orchestration.
//!
//! One call runs the whole difference pipeline on a (previous, current)
//! frame pair: grayscale, blur, absolute difference, binary
//! threshold, dilation, boundary tracing, convex hulls, blob filter. Every
//! intermediate buffer is scoped to the call; only the report leaves.

use image::{GrayImage, RgbImage};

use crate::blob::{Blob, BlobFilter};
use crate::config::{FilterSettings, PipelineSettings};
use crate::vision::{Boundary, VisionOps};

/// What one frame pair produced.
pub struct FrameReport {
    /// Hulls that passed the geometric filter.
    pub blobs: Vec<Blob>,
    /// All traced region boundaries, accepted or not (debug views).
    pub boundaries: Vec<Boundary>,
    /// The dilated threshold map the boundaries were traced from.
    pub threshold_map: GrayImage,
}

impl FrameReport {
    /// Number of candidate regions evaluated by the filter.
    pub fn candidate_count(&self) -> usize {
        self.boundaries.len()
    }
}

/// The difference pipeline, generic over the vision backend.
pub struct MotionPipeline<O: VisionOps> {
    ops: O,
    pipeline: PipelineSettings,
    filter: BlobFilter,
}

impl<O: VisionOps> MotionPipeline<O> {
    pub fn new(ops: O, pipeline: PipelineSettings, filter: FilterSettings) -> Self {
        Self {
            ops,
            pipeline,
            filter: BlobFilter::new(filter),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.ops.name()
    }

    /// Run the pipeline on one frame pair.
    pub fn process(&self, previous: &RgbImage, current: &RgbImage) -> FrameReport {
        let prev_gray = self.ops.blur(
            &self.ops.to_grayscale(previous),
            self.pipeline.blur_kernel,
        );
        let curr_gray = self.ops.blur(
            &self.ops.to_grayscale(current),
            self.pipeline.blur_kernel,
        );

        let diff = self.ops.absdiff(&prev_gray, &curr_gray);
        let thresholded = self.ops.threshold(&diff, self.pipeline.diff_threshold);
        let threshold_map = self.ops.dilate(&thresholded, self.pipeline.dilation_kernel);

        let boundaries = self.ops.find_boundaries(&threshold_map);

        let blobs = boundaries
            .iter()
            .map(|boundary| self.ops.convex_hull(boundary))
            .filter_map(Blob::from_hull)
            .filter(|blob| self.filter.accepts(blob))
            .collect();

        FrameReport {
            blobs,
            boundaries,
            threshold_map,
        }
    }
}
