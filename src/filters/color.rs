//! HSL conversions used by the hue shift and the simulated-effect path.

/// RGB (0..1) → HSL (H: 0..1, S: 0..1, L: 0..1)
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

/// HSL (H: 0..1, S: 0..1, L: 0..1) → RGB (0..1)
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

pub fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Rotates the hue of an 8-bit RGB triple by `degrees`, returning 0..255 floats.
pub fn shift_hue(r: f32, g: f32, b: f32, degrees: f32) -> (f32, f32, f32) {
    let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
    let hue = (h * 360.0 + degrees).rem_euclid(360.0) / 360.0;
    let (nr, ng, nb) = hsl_to_rgb(hue, s, l);
    ((nr * 255.0).round(), (ng * 255.0).round(), (nb * 255.0).round())
}
