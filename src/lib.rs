//! motionwatch
//!
//! This crate implements a frame-differencing motion detector over a video
//! stream: consecutive frames are grayscaled, blurred, differenced,
//! thresholded and dilated; the changed regions are traced into contours,
//! wrapped in convex hulls, and filtered geometrically into accepted blobs
//! that get annotated on the output frame.
//!
//! The vision math itself (blur, threshold, dilation, contour tracing,
//! convex hull) is delegated to the `image`/`imageproc` crates behind the
//! narrow [`vision::VisionOps`] seam; the original logic of this program is
//! the blob filter and the per-frame orchestration loop.
//!
//! # Module Structure
//!
//! - `config`: typed settings (file + env overrides) with the pipeline and
//!   filter constants
//! - `source`: sequential frame sources (file, synthetic, in-memory)
//! - `vision`: the vision-op capability seam and its imageproc backend
//! - `blob`: blob geometry and the five-predicate acceptance filter
//! - `pipeline`: per-frame-pair orchestration producing a `FrameReport`
//! - `render`: overlay and debug-view rendering
//! - `display`: presentation seam (headless, snapshot) and cancel polling
//! - `runtime`: the loop controller state machine

pub mod blob;
pub mod config;
pub mod display;
pub mod pipeline;
pub mod render;
pub mod runtime;
pub mod source;
pub mod vision;

pub use blob::{Blob, BlobFilter, BoundingRect};
pub use config::{DisplaySettings, FilterSettings, MotionConfig, PipelineSettings, SourceSettings};
pub use display::{CancelFlag, Display, HeadlessDisplay, KeyPoll, SnapshotDisplay, View};
pub use pipeline::{FrameReport, MotionPipeline};
pub use runtime::{LoopController, LoopState, RunSummary};
pub use source::{FileConfig, FileSource, FrameSource, MemorySource, SourceError};
pub use vision::{Boundary, ImageprocOps, VisionOps};

/// Process exit code for a normal run, including reaching end of stream.
pub const EXIT_OK: i32 = 0;
/// Process exit code when the source cannot be opened.
pub const EXIT_SOURCE_UNAVAILABLE: i32 = -1;
/// Process exit code when the source holds fewer than two frames.
pub const EXIT_TOO_FEW_FRAMES: i32 = -2;
