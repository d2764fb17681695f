use binoc_cache::ResolvedImage;
use binoc_compositor::{StereoOverlay, render_side_by_side};
use criterion::{Criterion, criterion_group, criterion_main};
use tiny_skia::{Color, Pixmap};

fn checker(w: u32, h: u32) -> ResolvedImage {
    let mut pm = Pixmap::new(w, h).expect("pixmap");
    pm.fill(Color::from_rgba8(30, 30, 30, 255));
    let mut white = tiny_skia::Paint::default();
    white.set_color(Color::from_rgba8(230, 230, 230, 255));
    for y in (0..h).step_by(16) {
        for x in (0..w).step_by(32) {
            if let Some(rect) =
                tiny_skia::Rect::from_xywh(x as f32, y as f32, 16.0, 16.0)
            {
                pm.fill_rect(rect, &white, tiny_skia::Transform::identity(), None);
            }
        }
    }
    ResolvedImage::from_pixmap(pm)
}

fn bench_side_by_side(c: &mut Criterion) {
    let mut frame = Pixmap::new(1920, 1080).expect("pixmap");

    // scaled path: sources need resampling into the 960-wide half
    let mut overlay = StereoOverlay::new();
    overlay.bind(checker(512, 512), checker(512, 512));
    c.bench_function("blit_scaled", |b| {
        b.iter(|| render_side_by_side(&overlay, &mut frame))
    });

    // exact path: sources match the slot, row copies only
    let mut exact = StereoOverlay::new();
    exact.bind(checker(960, 1080), checker(960, 1080));
    c.bench_function("blit_exact", |b| {
        b.iter(|| render_side_by_side(&exact, &mut frame))
    });
}

criterion_group!(benches, bench_side_by_side);
criterion_main!(benches);
