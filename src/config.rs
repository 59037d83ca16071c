use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SOURCE_PATH: &str = "stub://scene";
const DEFAULT_TARGET_FPS: u32 = 25;
const DEFAULT_BLUR_KERNEL: u32 = 5;
const DEFAULT_DIFF_THRESHOLD: u8 = 30;
const DEFAULT_DILATION_KERNEL: u32 = 5;
const DEFAULT_MIN_AREA: u32 = 100;
const DEFAULT_ASPECT_RATIO_MIN: f64 = 0.2;
const DEFAULT_ASPECT_RATIO_MAX: f64 = 1.2;
const DEFAULT_MIN_WIDTH: u32 = 15;
const DEFAULT_MIN_HEIGHT: u32 = 20;
const DEFAULT_MIN_DIAGONAL: f64 = 30.0;
const DEFAULT_SNAPSHOT_STRIDE: u64 = 25;

#[derive(Debug, Deserialize, Default)]
struct MotionConfigFile {
    source: Option<SourceSection>,
    pipeline: Option<PipelineSection>,
    filter: Option<FilterSection>,
    display: Option<DisplaySection>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceSection {
    path: Option<String>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct PipelineSection {
    blur_kernel: Option<u32>,
    diff_threshold: Option<u8>,
    dilation_kernel: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct FilterSection {
    min_area: Option<u32>,
    aspect_ratio_min: Option<f64>,
    aspect_ratio_max: Option<f64>,
    min_width: Option<u32>,
    min_height: Option<u32>,
    min_diagonal: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct DisplaySection {
    snapshot_dir: Option<PathBuf>,
    snapshot_stride: Option<u64>,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone)]
pub struct MotionConfig {
    pub source: SourceSettings,
    pub pipeline: PipelineSettings,
    pub filter: FilterSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Local file path or a `stub://` synthetic scene handle.
    pub path: String,
    /// Target frame rate; drives the per-frame key-poll timeout.
    pub target_fps: u32,
}

/// Knobs for the difference pipeline. Kernels are side lengths in pixels and
/// must be odd.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub blur_kernel: u32,
    pub diff_threshold: u8,
    pub dilation_kernel: u32,
}

/// Geometric acceptance thresholds for candidate blobs.
///
/// Area, width, height and diagonal are strict lower bounds; the aspect-ratio
/// range is inclusive on both ends.
#[derive(Debug, Clone)]
pub struct FilterSettings {
    pub min_area: u32,
    pub aspect_ratio_min: f64,
    pub aspect_ratio_max: f64,
    pub min_width: u32,
    pub min_height: u32,
    pub min_diagonal: f64,
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    /// When set, annotated views are written here as PNG snapshots.
    pub snapshot_dir: Option<PathBuf>,
    /// Write every Nth frame of each view.
    pub snapshot_stride: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_SOURCE_PATH.to_string(),
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            blur_kernel: DEFAULT_BLUR_KERNEL,
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            dilation_kernel: DEFAULT_DILATION_KERNEL,
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            aspect_ratio_min: DEFAULT_ASPECT_RATIO_MIN,
            aspect_ratio_max: DEFAULT_ASPECT_RATIO_MAX,
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            min_diagonal: DEFAULT_MIN_DIAGONAL,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            snapshot_dir: None,
            snapshot_stride: DEFAULT_SNAPSHOT_STRIDE,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            pipeline: PipelineSettings::default(),
            filter: FilterSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl MotionConfig {
    /// Load configuration: optional TOML file named by `MOTIONWATCH_CONFIG`,
    /// then per-field environment overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("MOTIONWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit TOML file path (CLI `--config`), with env
    /// overrides applied on top.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::from_file(read_config_file(path)?);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MotionConfigFile) -> Self {
        let defaults = MotionConfig::default();
        let source = SourceSettings {
            path: file
                .source
                .as_ref()
                .and_then(|s| s.path.clone())
                .unwrap_or(defaults.source.path),
            target_fps: file
                .source
                .as_ref()
                .and_then(|s| s.target_fps)
                .unwrap_or(defaults.source.target_fps),
        };
        let pipeline = PipelineSettings {
            blur_kernel: file
                .pipeline
                .as_ref()
                .and_then(|p| p.blur_kernel)
                .unwrap_or(defaults.pipeline.blur_kernel),
            diff_threshold: file
                .pipeline
                .as_ref()
                .and_then(|p| p.diff_threshold)
                .unwrap_or(defaults.pipeline.diff_threshold),
            dilation_kernel: file
                .pipeline
                .as_ref()
                .and_then(|p| p.dilation_kernel)
                .unwrap_or(defaults.pipeline.dilation_kernel),
        };
        let filter = FilterSettings {
            min_area: file
                .filter
                .as_ref()
                .and_then(|f| f.min_area)
                .unwrap_or(defaults.filter.min_area),
            aspect_ratio_min: file
                .filter
                .as_ref()
                .and_then(|f| f.aspect_ratio_min)
                .unwrap_or(defaults.filter.aspect_ratio_min),
            aspect_ratio_max: file
                .filter
                .as_ref()
                .and_then(|f| f.aspect_ratio_max)
                .unwrap_or(defaults.filter.aspect_ratio_max),
            min_width: file
                .filter
                .as_ref()
                .and_then(|f| f.min_width)
                .unwrap_or(defaults.filter.min_width),
            min_height: file
                .filter
                .as_ref()
                .and_then(|f| f.min_height)
                .unwrap_or(defaults.filter.min_height),
            min_diagonal: file
                .filter
                .as_ref()
                .and_then(|f| f.min_diagonal)
                .unwrap_or(defaults.filter.min_diagonal),
        };
        let display = DisplaySettings {
            snapshot_dir: file.display.as_ref().and_then(|d| d.snapshot_dir.clone()),
            snapshot_stride: file
                .display
                .as_ref()
                .and_then(|d| d.snapshot_stride)
                .unwrap_or(defaults.display.snapshot_stride),
        };
        Self {
            source,
            pipeline,
            filter,
            display,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("MOTIONWATCH_SOURCE") {
            if !path.trim().is_empty() {
                self.source.path = path;
            }
        }
        if let Ok(fps) = std::env::var("MOTIONWATCH_FPS") {
            self.source.target_fps = fps
                .parse()
                .map_err(|_| anyhow!("MOTIONWATCH_FPS must be an integer frame rate"))?;
        }
        if let Ok(threshold) = std::env::var("MOTIONWATCH_DIFF_THRESHOLD") {
            self.pipeline.diff_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("MOTIONWATCH_DIFF_THRESHOLD must be 0-255"))?;
        }
        if let Ok(dir) = std::env::var("MOTIONWATCH_SNAPSHOT_DIR") {
            if !dir.trim().is_empty() {
                self.display.snapshot_dir = Some(PathBuf::from(dir));
            }
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.source.target_fps == 0 {
            return Err(anyhow!("source.target_fps must be at least 1"));
        }
        for (name, k) in [
            ("pipeline.blur_kernel", self.pipeline.blur_kernel),
            ("pipeline.dilation_kernel", self.pipeline.dilation_kernel),
        ] {
            if k == 0 || k % 2 == 0 {
                return Err(anyhow!("{} must be odd and non-zero (got {})", name, k));
            }
        }
        if self.filter.aspect_ratio_min > self.filter.aspect_ratio_max {
            return Err(anyhow!(
                "filter.aspect_ratio_min ({}) exceeds filter.aspect_ratio_max ({})",
                self.filter.aspect_ratio_min,
                self.filter.aspect_ratio_max
            ));
        }
        if self.display.snapshot_stride == 0 {
            return Err(anyhow!("display.snapshot_stride must be at least 1"));
        }
        Ok(())
    }

    /// Delay between key polls, derived from the target frame rate.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis((1000 / self.source.target_fps.max(1)) as u64)
    }
}

fn read_config_file(path: &Path) -> Result<MotionConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
