use std::ops::ControlFlow;

use tempfile::tempdir;

use still_motion::{
    config::SinkKind,
    effects::{render_frame, scaled_crop_or_pad, translate, Effect, FrameClock},
    jobs::{BatchProcessor, RenderJob, RenderPipeline},
    video::{load_image, Frame, MemorySink},
    Config, FrameSequencer,
};

fn checkerboard(width: u32, height: u32) -> Frame {
    Frame::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            [240, 240, 240]
        } else {
            [20, 40, 200]
        }
    })
}

fn png_config(duration: f64, fps: u32) -> Config {
    let mut config = Config::default();
    config.output.sink = SinkKind::Png;
    config.render.duration = duration;
    config.render.fps = fps;
    config.render.threads = 3;
    config
}

#[test]
fn every_effect_keeps_the_source_size() {
    let image = checkerboard(33, 21);
    for effect in Effect::ALL {
        for index in [0, 1, 29, 30, 59] {
            let frame = render_frame(&image, effect, FrameClock::new(index, 60, 30), 33, 21).unwrap();
            assert_eq!(frame.dimensions(), (33, 21), "{effect} at frame {index}");
        }
    }
}

#[test]
fn written_frames_match_the_engine() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("board.png");
    let source = checkerboard(24, 16);
    source.save_png(&input).unwrap();

    let pipeline = RenderPipeline::new(png_config(1.0, 8));
    let output = dir.path().join("board_frames");
    let job = RenderJob::from_config(&input, &output, pipeline.config()).with_effect(Effect::PanLeftToRight);

    let mut percents = Vec::new();
    let outcome = pipeline
        .render_with_progress(&job, |p| {
            percents.push(p.percent());
            ControlFlow::Continue(())
        })
        .unwrap();

    assert_eq!(outcome.summary.frames_written, 8);
    assert_eq!(percents.last().copied(), Some(100.0));

    // 1.2x crop drifting from dx = trunc(-2.4) to trunc(-2.4 + 4.8 * 7/8)
    let zoomed = scaled_crop_or_pad(&source, 1.2).unwrap();
    for index in 0..8u64 {
        let t = index as f64 / 8.0;
        let dx = (-0.1 * 24.0 + 0.2 * 24.0 * t) as i64;
        let written = load_image(output.join(format!("frame_{:06}.png", index))).unwrap();
        assert_eq!(written, translate(&zoomed, dx, 0), "frame {index}");
    }
}

#[test]
fn memory_sequence_of_ken_burns_starts_on_the_original() {
    let image = checkerboard(40, 30);
    let mut sink = MemorySink::new();
    FrameSequencer::new(Effect::KenBurns, 2.0, 12).run(&image, &mut sink).unwrap();

    assert_eq!(sink.frames().len(), 24);
    assert_eq!(sink.frames()[0], image);

    // Last frame: t = 23/24, scale 1 + 0.3t, drift 5% of each side times t
    let t = 23.0 / 24.0;
    let zoomed = scaled_crop_or_pad(&image, 1.0 + 0.3 * t).unwrap();
    let expected = translate(&zoomed, (0.05 * 40.0 * t) as i64, (0.05 * 30.0 * t) as i64);
    assert_eq!(sink.frames()[23], expected);
}

#[test]
fn batch_renders_good_images_and_skips_broken_ones() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    checkerboard(16, 16).save_png(input.path().join("one.png")).unwrap();
    checkerboard(12, 20).save_png(input.path().join("three.png")).unwrap();
    std::fs::write(input.path().join("two.png"), b"\x89PNG truncated").unwrap();

    let report = BatchProcessor::new(png_config(0.5, 6))
        .process_folder(input.path(), output.path(), Effect::ZoomIn, "")
        .unwrap();

    assert_eq!(report.rendered.len(), 2);
    assert_eq!(report.skipped, vec![input.path().join("two.png")]);
    assert!(output.path().join("one_zoom_in/frame_000002.png").exists());
    assert!(output.path().join("three_zoom_in/frame_000002.png").exists());
    assert!(!output.path().join("two_zoom_in").exists());
}
