/// Linear interpolation between two 8-bit values
///
/// Computes `a + (b - a) * step / steps` with the fraction rounded down, so a
/// fade toward black truncates like one toward white and the result always
/// lies between `a` and `b` inclusive. `step == 0` yields `a`
/// and `step >= steps` yields `b`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn lerp8(a: u8, b: u8, step: u32, steps: u32) -> u8 {
    if steps == 0 || step >= steps {
        return b;
    }
    let delta = b as i64 - a as i64;
    let value = a as i64 + (delta * step as i64).div_euclid(steps as i64);

    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}
