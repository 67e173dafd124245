use crate::{color::Rgb, math8::lerp8};

/// Interpolate two RGB colors channel by channel
///
/// # Arguments
/// * `a` - Color at step 0
/// * `b` - Color at `steps`
/// * `step` - Current step (clamped to `steps`)
/// * `steps` - Total number of steps
#[inline]
pub const fn lerp_color(a: Rgb, b: Rgb, step: u32, steps: u32) -> Rgb {
    Rgb {
        r: lerp8(a.r, b.r, step, steps),
        g: lerp8(a.g, b.g, step, steps),
        b: lerp8(a.b, b.b, step, steps),
    }
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}
