//! Production vision backend over `image` + `imageproc`.
//!
//! Every operation is a thin delegation; nothing here reimplements vision
//! math. The only local decision is the blur-kernel-to-sigma mapping, which
//! follows the conventional `0.3 * ((k - 1) * 0.5 - 1) + 0.8` rule so a 5x5 kernel
//! behaves like the common vision-library default.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::convex_hull;
use imageproc::map::map_colors2;
use imageproc::morphology::dilate;

use super::backend::{Boundary, VisionOps};

/// Vision backend delegating to the imageproc crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageprocOps;

impl ImageprocOps {
    pub fn new() -> Self {
        Self
    }
}

/// Sigma for a Gaussian kernel of side `kernel`, matching the usual
/// vision-library derivation for an unspecified sigma.
fn kernel_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel.max(1) as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

impl VisionOps for ImageprocOps {
    fn name(&self) -> &'static str {
        "imageproc"
    }

    fn to_grayscale(&self, frame: &RgbImage) -> GrayImage {
        image::imageops::grayscale(frame)
    }

    fn blur(&self, image: &GrayImage, kernel: u32) -> GrayImage {
        gaussian_blur_f32(image, kernel_sigma(kernel))
    }

    fn absdiff(&self, a: &GrayImage, b: &GrayImage) -> GrayImage {
        map_colors2(a, b, |p, q| Luma([p[0].abs_diff(q[0])]))
    }

    fn threshold(&self, image: &GrayImage, cutoff: u8) -> GrayImage {
        threshold(image, cutoff, ThresholdType::Binary)
    }

    fn dilate(&self, image: &GrayImage, kernel: u32) -> GrayImage {
        // A square element of side 2k+1 under the L-infinity norm.
        let k = (kernel.max(1) - 1) / 2;
        dilate(image, Norm::LInf, k as u8)
    }

    fn find_boundaries(&self, mask: &GrayImage) -> Vec<Boundary> {
        find_contours::<i32>(mask)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| c.points)
            .collect()
    }

    fn convex_hull(&self, boundary: &Boundary) -> Boundary {
        if boundary.is_empty() {
            return Vec::new();
        }
        convex_hull(&boundary[..])
    }
}
