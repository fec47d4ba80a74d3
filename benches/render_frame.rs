use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use still_motion::{render_frame, Effect, Frame, FrameClock};

fn bench_effects(c: &mut Criterion) {
    let image = Frame::from_fn(640, 360, |x, y| [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
    let clock = FrameClock::new(60, 120, 24);

    let mut group = c.benchmark_group("render_frame_640x360");
    for effect in Effect::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(effect.name()), &effect, |b, &effect| {
            b.iter(|| render_frame(black_box(&image), effect, clock, 640, 360))
        });
    }
    group.finish();
}

fn bench_downscaled_target(c: &mut Criterion) {
    let image = Frame::new_filled(1920, 1080, [40, 90, 160]);
    let clock = FrameClock::new(30, 120, 24);

    c.bench_function("ken_burns_1080p_to_720p", |b| {
        b.iter(|| render_frame(black_box(&image), Effect::KenBurns, clock, 1280, 720))
    });
}

criterion_group!(benches, bench_effects, bench_downscaled_target);
criterion_main!(benches);
