use std::io::Write;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use motionwatch::MotionConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "MOTIONWATCH_CONFIG",
        "MOTIONWATCH_SOURCE",
        "MOTIONWATCH_FPS",
        "MOTIONWATCH_DIFF_THRESHOLD",
        "MOTIONWATCH_SNAPSHOT_DIR",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let toml = r#"
        [source]
        path = "lot.mp4"
        target_fps = 12

        [pipeline]
        blur_kernel = 7
        diff_threshold = 40
        dilation_kernel = 3

        [filter]
        min_area = 200
        aspect_ratio_min = 0.3
        aspect_ratio_max = 1.5
        min_width = 20
        min_height = 25
        min_diagonal = 35.0

        [display]
        snapshot_dir = "frames_out"
        snapshot_stride = 10
    "#;
    file.write_all(toml.as_bytes()).expect("write config");

    std::env::set_var("MOTIONWATCH_CONFIG", file.path());
    std::env::set_var("MOTIONWATCH_SOURCE", "stub://override");
    std::env::set_var("MOTIONWATCH_DIFF_THRESHOLD", "25");

    let cfg = MotionConfig::load().expect("load config");

    // Environment wins over the file.
    assert_eq!(cfg.source.path, "stub://override");
    assert_eq!(cfg.pipeline.diff_threshold, 25);

    // File wins over defaults.
    assert_eq!(cfg.source.target_fps, 12);
    assert_eq!(cfg.pipeline.blur_kernel, 7);
    assert_eq!(cfg.pipeline.dilation_kernel, 3);
    assert_eq!(cfg.filter.min_area, 200);
    assert_eq!(cfg.filter.aspect_ratio_min, 0.3);
    assert_eq!(cfg.filter.aspect_ratio_max, 1.5);
    assert_eq!(cfg.filter.min_width, 20);
    assert_eq!(cfg.filter.min_height, 25);
    assert_eq!(cfg.filter.min_diagonal, 35.0);
    assert_eq!(
        cfg.display.snapshot_dir.as_deref(),
        Some(std::path::Path::new("frames_out"))
    );
    assert_eq!(cfg.display.snapshot_stride, 10);

    clear_env();
}

#[test]
fn missing_file_and_empty_env_yield_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = MotionConfig::load().expect("defaults load");
    assert_eq!(cfg.source.path, "stub://scene");
    assert_eq!(cfg.pipeline.diff_threshold, 30);
    assert_eq!(cfg.filter.min_area, 100);
    assert!(cfg.display.snapshot_dir.is_none());
}

#[test]
fn partial_file_keeps_defaults_for_missing_sections() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(b"[pipeline]\ndiff_threshold = 50\n")
        .expect("write config");

    let cfg = MotionConfig::load_from(file.path()).expect("load config");
    assert_eq!(cfg.pipeline.diff_threshold, 50);
    assert_eq!(cfg.pipeline.blur_kernel, 5);
    assert_eq!(cfg.filter.min_height, 20);

    clear_env();
}

#[test]
fn invalid_kernel_in_file_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(b"[pipeline]\nblur_kernel = 4\n")
        .expect("write config");

    let err = MotionConfig::load_from(file.path()).unwrap_err();
    assert!(err.to_string().contains("blur_kernel"));

    clear_env();
}

#[test]
fn unparsable_file_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(b"not = [valid toml").expect("write config");

    assert!(MotionConfig::load_from(file.path()).is_err());

    clear_env();
}
