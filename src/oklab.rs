//! OKLab Transform - sRGB <-> OKLCH
//!
//! Default [`OklchTransform`] used by the converter. Matrices are from
//! Björn Ottosson's OKLab definition, evaluated in `f64`.

use crate::convert::{Oklch, OklchTransform};

/// Below this chroma a color is treated as achromatic and its hue reported as 0.
pub const ACHROMATIC_EPSILON: f64 = 1e-6;

/// Reference OKLab transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct OklabTransform;

impl OklchTransform for OklabTransform {
    fn srgb_to_oklch(&self, rgb: [f64; 3]) -> Option<Oklch> {
        let linear = rgb.map(srgb_to_linear);
        let (l, a, b) = linear_srgb_to_oklab(linear);
        if !(l.is_finite() && a.is_finite() && b.is_finite()) {
            return None;
        }

        let c = a.hypot(b);
        let h = if c < ACHROMATIC_EPSILON {
            0.0
        } else {
            b.atan2(a).to_degrees().rem_euclid(360.0)
        };
        Some(Oklch { l, c, h })
    }

    fn oklch_to_srgb(&self, color: Oklch) -> Option<[f64; 3]> {
        let h_rad = color.h.to_radians();
        let (a, b) = (color.c * h_rad.cos(), color.c * h_rad.sin());
        let rgb = oklab_to_linear_srgb(color.l, a, b).map(linear_to_srgb);
        rgb.iter().all(|v| v.is_finite()).then_some(rgb)
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn linear_srgb_to_oklab([r, g, b]: [f64; 3]) -> (f64, f64, f64) {
    // Linear sRGB -> LMS
    let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
    let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
    let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

    let (l_, m_, s_) = (l.cbrt(), m.cbrt(), s.cbrt());

    (
        0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_,
        1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_,
        0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_,
    )
}

fn oklab_to_linear_srgb(l_ok: f64, a: f64, b: f64) -> [f64; 3] {
    let l_ = l_ok + 0.3963377774 * a + 0.2158037573 * b;
    let m_ = l_ok - 0.1055613458 * a - 0.0638541728 * b;
    let s_ = l_ok - 0.0894841775 * a - 1.2914855480 * b;

    let (l, m, s) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);

    [
        4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
        -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
        -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
    ]
}
