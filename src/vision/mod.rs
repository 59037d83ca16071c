//! Vision-op capability seam.
//!
//! The difference pipeline needs exactly seven operations from a vision
//! library: grayscale conversion, Gaussian blur, absolute difference, binary
//! threshold, dilation, boundary tracing and convex hull. [`VisionOps`]
//! captures that set so the orchestration and the blob filter can be
//! exercised against any backend; [`ImageprocOps`] is the production backend
//! delegating to the `image`/`imageproc` crates.

mod backend;
mod imageproc_ops;

pub use backend::{Boundary, VisionOps};
pub use imageproc_ops::ImageprocOps;
