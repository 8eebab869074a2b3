//! HSLuv (formerly HUSL): a perceptually even hue, saturation, lightness space.
//!
//! Unlike plain HSL, equal lightness steps look equally bright whatever the
//! hue, which keeps the hydro and water-speed ramps readable. Conversion goes
//! HSLuv -> LCh(uv) -> Luv -> XYZ -> linear sRGB -> sRGB, with the saturation
//! expressed as a fraction of the largest in-gamut chroma for that lightness
//! and hue.

use std::f64::consts::PI;

// XYZ to linear sRGB, D65.
const M: [[f64; 3]; 3] = [
    [3.240969941904521, -1.537383177570093, -0.498610760293],
    [-0.96924363628087, 1.87596750150772, 0.041555057407175],
    [0.055630079696993, -0.20397695888897, 1.056971514242878],
];

const REF_U: f64 = 0.19783000664283;
const REF_V: f64 = 0.46831999493879;
const KAPPA: f64 = 903.2962962;
const EPSILON: f64 = 0.0088564516;

/// Line `y = slope * x + intercept` bounding the sRGB gamut in the chroma plane.
#[derive(Clone, Copy, Debug)]
struct Line {
    slope: f64,
    intercept: f64,
}

// Six gamut edges for lightness `l`: each RGB channel hitting 0 and 1.
fn bounds(l: f64) -> [Line; 6] {
    let sub1 = (l + 16.0).powi(3) / 1_560_896.0;
    let sub2 = if sub1 > EPSILON { sub1 } else { l / KAPPA };

    let mut lines = [Line { slope: 0.0, intercept: 0.0 }; 6];
    for (c, [m1, m2, m3]) in M.iter().enumerate() {
        for t in 0..2 {
            let t = t as f64;
            let top1 = (284_517.0 * m1 - 94_839.0 * m3) * sub2;
            let top2 = (838_422.0 * m3 + 769_860.0 * m2 + 731_718.0 * m1) * l * sub2
                - 769_860.0 * t * l;
            let bottom = (632_260.0 * m3 - 126_452.0 * m2) * sub2 + 126_452.0 * t;
            lines[c * 2 + t as usize] = Line {
                slope: top1 / bottom,
                intercept: top2 / bottom,
            };
        }
    }
    lines
}

/// Largest chroma still inside sRGB for lightness `l` and hue `h` in degrees.
fn max_chroma(l: f64, h: f64) -> f64 {
    let theta = h / 360.0 * 2.0 * PI;
    bounds(l)
        .iter()
        .map(|line| line.intercept / (theta.sin() - line.slope * theta.cos()))
        .filter(|len| *len >= 0.0)
        .fold(f64::MAX, f64::min)
}

fn l_to_y(l: f64) -> f64 {
    if l <= 8.0 {
        l / KAPPA
    } else {
        ((l + 16.0) / 116.0).powi(3)
    }
}

fn from_linear(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// HSLuv to sRGB channels in `[0, 1]`.
///
/// `hue` is in degrees, `saturation` and `lightness` in `[0, 100]`.
pub fn husl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f64; 3] {
    let l = lightness.clamp(0.0, 100.0);
    if l > 99.999_999_9 {
        return [1.0, 1.0, 1.0];
    }
    if l < 1e-8 {
        return [0.0, 0.0, 0.0];
    }
    let h = hue.rem_euclid(360.0);
    let chroma = max_chroma(l, h) / 100.0 * saturation.clamp(0.0, 100.0);

    // LCh -> Luv
    let hrad = h / 360.0 * 2.0 * PI;
    let (u, v) = (chroma * hrad.cos(), chroma * hrad.sin());

    // Luv -> XYZ
    let var_u = u / (13.0 * l) + REF_U;
    let var_v = v / (13.0 * l) + REF_V;
    let y = l_to_y(l);
    let x = -(9.0 * y * var_u) / ((var_u - 4.0) * var_v - var_u * var_v);
    let z = (9.0 * y - 15.0 * var_v * y - var_v * x) / (3.0 * var_v);

    M.map(|[m1, m2, m3]| from_linear(m1 * x + m2 * y + m3 * z).clamp(0.0, 1.0))
}
