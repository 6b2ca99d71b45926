use image::GrayImage;
use rand::Rng;

/// Blend strength used when texture is enabled without an explicit value.
pub const DEFAULT_TEXTURE_STRENGTH: f32 = 0.07;

/// Blend uniform noise into a page: `out = (1 - s)·page + s·noise`.
///
/// `strength` is clamped to `[0, 1]`; zero leaves the page untouched.
pub fn apply_paper_texture<R: Rng + ?Sized>(page: &mut GrayImage, strength: f32, rng: &mut R) {
    let strength = if strength.is_finite() {
        strength.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if strength == 0.0 {
        return;
    }
    for px in page.pixels_mut() {
        let noise: u8 = rng.random();
        let blended = (1.0 - strength) * f32::from(px[0]) + strength * f32::from(noise);
        px[0] = blended.round().clamp(0.0, 255.0) as u8;
    }
}
