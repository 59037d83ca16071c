use image::{GrayImage, RgbImage};
use imageproc::point::Point;

/// An ordered sequence of integer points tracing a region boundary.
pub type Boundary = Vec<Point<i32>>;

/// The vision operations the difference pipeline delegates.
///
/// Implementations are pure with respect to their inputs: the same image in,
/// the same image out. Kernel arguments are square side lengths in pixels
/// (odd, per config validation); `threshold` maps values strictly greater
/// than the cutoff to white and everything else to black.
pub trait VisionOps {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Collapse a color frame to single-channel luminance.
    fn to_grayscale(&self, frame: &RgbImage) -> GrayImage;

    /// Gaussian blur with a `kernel` x `kernel` footprint.
    fn blur(&self, image: &GrayImage, kernel: u32) -> GrayImage;

    /// Per-pixel absolute difference. Panics if dimensions differ; the
    /// pipeline only ever diffs frames from the same stream.
    fn absdiff(&self, a: &GrayImage, b: &GrayImage) -> GrayImage;

    /// Binary threshold: strictly above `cutoff` becomes 255, else 0.
    fn threshold(&self, image: &GrayImage, cutoff: u8) -> GrayImage;

    /// Morphological dilation with a `kernel` x `kernel` square element.
    fn dilate(&self, image: &GrayImage, kernel: u32) -> GrayImage;

    /// Trace the external boundaries of the non-zero regions of `mask`.
    /// An empty mask yields an empty list.
    fn find_boundaries(&self, mask: &GrayImage) -> Vec<Boundary>;

    /// Smallest convex polygon enclosing `boundary`.
    fn convex_hull(&self, boundary: &Boundary) -> Boundary;
}
