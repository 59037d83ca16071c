//! Presentation seam.
//!
//! The loop controller talks to a [`Display`]: per-iteration views to show,
//! a key poll that doubles as frame pacing, and a hold hook for the
//! end-of-stream pause. Two implementations ship:
//!
//! - [`HeadlessDisplay`] discards frames and paces by sleeping; Ctrl-C
//!   stands in for the reserved cancel key.
//! - [`SnapshotDisplay`] additionally writes every Nth frame of each view
//!   as a PNG under a snapshot directory.

use anyhow::{Context, Result};
use image::RgbImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The rendered views of one iteration, matching the stages worth watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// The dilated binary threshold map.
    Threshold,
    /// All traced region boundaries.
    Boundaries,
    /// The hulls that passed the filter.
    Hulls,
    /// The current frame with boxes and center dots.
    Annotated,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Threshold => "threshold",
            View::Boundaries => "boundaries",
            View::Hulls => "hulls",
            View::Annotated => "annotated",
        }
    }
}

/// Result of one key poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPoll {
    /// No input, or input other than the reserved cancel key.
    None,
    /// The operator asked to stop.
    Cancel,
}

/// Where rendered frames go and where cancel requests come from.
pub trait Display {
    /// Present one view of the current iteration.
    fn show(&mut self, view: View, frame: &RgbImage) -> Result<()>;

    /// Wait up to `timeout` for operator input. Pacing and cancellation
    /// share this call, mirroring a vision-GUI wait-key.
    fn wait_key(&mut self, timeout: Duration) -> Result<KeyPoll>;

    /// Keep the final output available for inspection after end of stream.
    /// User-initiated exits skip this.
    fn hold(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn show(&mut self, view: View, frame: &RgbImage) -> Result<()> {
        (**self).show(view, frame)
    }

    fn wait_key(&mut self, timeout: Duration) -> Result<KeyPoll> {
        (**self).wait_key(timeout)
    }

    fn hold(&mut self) -> Result<()> {
        (**self).hold()
    }
}

// ----------------------------------------------------------------------------
// Cancel flag
// ----------------------------------------------------------------------------

/// Shared cancellation flag, raised by the operator (Ctrl-C) or by tests.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route Ctrl-C to this flag. Call once per process, from the binary.
    pub fn install_ctrlc(&self) -> Result<()> {
        let flag = self.0.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .context("install cancel handler")
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleep through `timeout`, reporting Cancel if the flag was raised
    /// before or during the wait.
    fn poll(&self, timeout: Duration) -> KeyPoll {
        if self.is_raised() {
            return KeyPoll::Cancel;
        }
        std::thread::sleep(timeout);
        if self.is_raised() {
            KeyPoll::Cancel
        } else {
            KeyPoll::None
        }
    }
}

// ----------------------------------------------------------------------------
// Headless display
// ----------------------------------------------------------------------------

/// Discards frames; paces the loop and reports cancellation.
pub struct HeadlessDisplay {
    cancel: CancelFlag,
}

impl HeadlessDisplay {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { cancel }
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, view: View, frame: &RgbImage) -> Result<()> {
        log::trace!(
            "view {}: {}x{} frame",
            view.as_str(),
            frame.width(),
            frame.height()
        );
        Ok(())
    }

    fn wait_key(&mut self, timeout: Duration) -> Result<KeyPoll> {
        Ok(self.cancel.poll(timeout))
    }

    fn hold(&mut self) -> Result<()> {
        log::info!("end of stream; no display surface to hold open");
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Snapshot display
// ----------------------------------------------------------------------------

/// Writes every Nth presented frame of each view as a PNG.
pub struct SnapshotDisplay {
    dir: PathBuf,
    stride: u64,
    counters: HashMap<View, u64>,
    cancel: CancelFlag,
}

impl SnapshotDisplay {
    pub fn create(dir: PathBuf, stride: u64, cancel: CancelFlag) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create snapshot directory {}", dir.display()))?;
        Ok(Self {
            dir,
            stride: stride.max(1),
            counters: HashMap::new(),
            cancel,
        })
    }
}

impl Display for SnapshotDisplay {
    fn show(&mut self, view: View, frame: &RgbImage) -> Result<()> {
        let count = self.counters.entry(view).or_insert(0);
        let index = *count;
        *count += 1;
        if index % self.stride != 0 {
            return Ok(());
        }
        let path = self.dir.join(format!("{}_{:06}.png", view.as_str(), index));
        frame
            .save(&path)
            .with_context(|| format!("write snapshot {}", path.display()))?;
        Ok(())
    }

    fn wait_key(&mut self, timeout: Duration) -> Result<KeyPoll> {
        Ok(self.cancel.poll(timeout))
    }

    fn hold(&mut self) -> Result<()> {
        log::info!(
            "end of stream; final snapshots left in {}",
            self.dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn cancel_flag_reports_cancel_once_raised() {
        let flag = CancelFlag::new();
        assert_eq!(flag.poll(Duration::from_millis(1)), KeyPoll::None);
        flag.raise();
        assert_eq!(flag.poll(Duration::from_millis(1)), KeyPoll::Cancel);
    }

    #[test]
    fn headless_display_accepts_frames() {
        let mut display = HeadlessDisplay::new(CancelFlag::new());
        let frame = RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]));
        display.show(View::Annotated, &frame).unwrap();
        assert_eq!(
            display.wait_key(Duration::from_millis(1)).unwrap(),
            KeyPoll::None
        );
        display.hold().unwrap();
    }

    #[test]
    fn snapshot_display_writes_strided_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let mut display =
            SnapshotDisplay::create(dir.path().to_path_buf(), 2, CancelFlag::new()).unwrap();
        let frame = RgbImage::from_pixel(8, 8, Rgb([50, 60, 70]));

        for _ in 0..4 {
            display.show(View::Annotated, &frame).unwrap();
        }

        assert!(dir.path().join("annotated_000000.png").exists());
        assert!(!dir.path().join("annotated_000001.png").exists());
        assert!(dir.path().join("annotated_000002.png").exists());
    }
}
