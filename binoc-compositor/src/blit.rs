use crate::overlay::StereoOverlay;
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

/// Software stand-in for the stereo headset compositor: left slot into the
/// left half of the frame, right slot into the right half, letterboxed on a
/// black background. A disabled overlay renders as a black frame.
pub fn render_side_by_side(overlay: &StereoOverlay, frame: &mut Pixmap) {
    frame.fill(Color::BLACK);
    if !overlay.enabled() {
        return;
    }
    let half = frame.width() / 2;
    blit_eye(overlay.left().pixmap(), frame, 0, half);
    blit_eye(overlay.right().pixmap(), frame, half, frame.width() - half);
}

fn blit_eye(src: &Pixmap, dst: &mut Pixmap, x_off: u32, slot_w: u32) {
    let slot_h = dst.height();
    if slot_w == 0 || slot_h == 0 || src.width() == 0 || src.height() == 0 {
        return;
    }

    if src.width() == slot_w && src.height() == slot_h {
        blit_rows(src, dst, x_off);
        return;
    }

    let scale = (slot_w as f32 / src.width() as f32).min(slot_h as f32 / src.height() as f32);
    let draw_w = src.width() as f32 * scale;
    let draw_h = src.height() as f32 * scale;
    let tx = x_off as f32 + (slot_w as f32 - draw_w) * 0.5;
    let ty = (slot_h as f32 - draw_h) * 0.5;

    // Bilinear sampling; the bounded destination rect gives clamped edges.
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    dst.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &paint,
        Transform::from_row(scale, 0.0, 0.0, scale, tx, ty),
        None,
    );
}

/// Exact-size fast path: straight row copies, no sampling.
fn blit_rows(src: &Pixmap, dst: &mut Pixmap, x_off: u32) {
    let src_w = src.width() as usize;
    let dst_stride = dst.width() as usize;
    let rows = src.height() as usize;
    let x_off = x_off as usize;

    let src_px = src.pixels();
    let dst_px = dst.pixels_mut();

    for y in 0..rows {
        let src_row = &src_px[y * src_w..(y + 1) * src_w];
        let dst_start = y * dst_stride + x_off;
        dst_px[dst_start..dst_start + src_w].copy_from_slice(src_row);
    }
}
