//! Small RGB helpers for palette decoding and tint offsets.
//!
//! Colours are plain `Vec3` triples in \[0, 1\].

use glam::Vec3;

/// Decode a `0xRRGGBB` value.
#[inline]
pub fn from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}

/// RGB -> (hue, saturation, lightness), each in \[0, 1\].
pub fn to_hsl(c: Vec3) -> (f32, f32, f32) {
    let max = c.max_element();
    let min = c.min_element();
    let l = (max + min) * 0.5;
    if (max - min).abs() < f32::EPSILON {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == c.x {
        (c.y - c.z) / d + if c.y < c.z { 6.0 } else { 0.0 }
    } else if max == c.y {
        (c.z - c.x) / d + 2.0
    } else {
        (c.x - c.y) / d + 4.0
    };
    (h / 6.0, s, l)
}

pub fn from_hsl(h: f32, s: f32, l: f32) -> Vec3 {
    if s <= 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Shift a colour in HSL space; saturation and lightness are clamped.
pub fn offset_hsl(c: Vec3, dh: f32, ds: f32, dl: f32) -> Vec3 {
    let (h, s, l) = to_hsl(c);
    from_hsl(
        (h + dh).rem_euclid(1.0),
        (s + ds).clamp(0.0, 1.0),
        (l + dl).clamp(0.0, 1.0),
    )
}
