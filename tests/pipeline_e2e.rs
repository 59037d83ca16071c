//! End-to-end scenarios over scripted sources.

use std::time::Duration;

use image::{Rgb, RgbImage};

use motionwatch::{
    CancelFlag, FileConfig, FileSource, FilterSettings, HeadlessDisplay, ImageprocOps,
    LoopController, LoopState, MemorySource, MotionPipeline, PipelineSettings, SourceError,
    EXIT_SOURCE_UNAVAILABLE, EXIT_TOO_FEW_FRAMES,
};

fn pipeline() -> MotionPipeline<ImageprocOps> {
    MotionPipeline::new(
        ImageprocOps::new(),
        PipelineSettings::default(),
        FilterSettings::default(),
    )
}

fn controller(
    frames: Vec<RgbImage>,
    cancel: CancelFlag,
) -> LoopController<ImageprocOps, MemorySource, HeadlessDisplay> {
    LoopController::new(
        MemorySource::new(frames),
        pipeline(),
        HeadlessDisplay::new(cancel),
        Duration::from_millis(1),
    )
}

fn flat(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([32, 32, 32]))
}

#[test]
fn identical_two_frame_source_ends_cleanly_with_zero_blobs() {
    let frames = vec![flat(160, 120), flat(160, 120)];
    let summary = controller(frames, CancelFlag::new()).run().unwrap();

    assert_eq!(summary.state, LoopState::EndOfStream);
    assert_eq!(summary.pairs_processed, 1);
    assert_eq!(summary.blobs_total, 0);
}

#[test]
fn unopenable_source_maps_to_unavailable() {
    let err = FileSource::open(FileConfig {
        path: "definitely/missing.mp4".to_string(),
        target_fps: 25,
    })
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<SourceError>(),
        Some(&SourceError::Unavailable)
    );
    assert_eq!(EXIT_SOURCE_UNAVAILABLE, -1);
}

#[test]
fn single_frame_source_maps_to_too_few_frames() {
    let err = controller(vec![flat(64, 64)], CancelFlag::new())
        .run()
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<SourceError>(),
        Some(&SourceError::TooFewFrames)
    );
    assert_eq!(EXIT_TOO_FEW_FRAMES, -2);
}

#[test]
fn appearing_rectangle_yields_exactly_one_centered_blob() {
    let background = flat(320, 240);
    let mut second = background.clone();
    // A 50x60 filled rectangle absent from frame 1.
    for y in 90..150 {
        for x in 120..170 {
            second.put_pixel(x, y, Rgb([250, 250, 250]));
        }
    }

    let report = pipeline().process(&background, &second);
    assert_eq!(report.blobs.len(), 1);

    let blob = &report.blobs[0];
    // Bounding box matches the inserted rectangle within blur/dilation
    // tolerance; the center sits at the rectangle's centroid.
    assert!((blob.bounding.width as i64 - 50).unsigned_abs() <= 8);
    assert!((blob.bounding.height as i64 - 60).unsigned_abs() <= 8);
    assert!((blob.center.0 - 145).abs() <= 4);
    assert!((blob.center.1 - 120).abs() <= 4);

    // The same pair through the loop controller reports the same blob.
    let summary = controller(vec![background, second], CancelFlag::new())
        .run()
        .unwrap();
    assert_eq!(summary.state, LoopState::EndOfStream);
    assert_eq!(summary.blobs_total, 1);
}

#[test]
fn pre_raised_cancel_exits_after_one_pair() {
    let frames = vec![flat(64, 64); 10];
    let cancel = CancelFlag::new();
    cancel.raise();

    let summary = controller(frames, cancel).run().unwrap();
    assert_eq!(summary.state, LoopState::UserExit);
    assert_eq!(summary.pairs_processed, 1);
}

#[test]
fn synthetic_scene_produces_motion_blobs() {
    let mut source = FileSource::open(FileConfig {
        path: "stub://scene".to_string(),
        target_fps: 25,
    })
    .unwrap();

    use motionwatch::FrameSource;
    let first = source.next_frame().unwrap().unwrap();
    let second = source.next_frame().unwrap().unwrap();

    // The marching square moved between frames, so the pipeline sees one
    // changed region.
    let report = pipeline().process(&first, &second);
    assert_eq!(report.blobs.len(), 1);
}
