//! Noise decorators used to build tileable terrain octaves.
//!
//! Both adapters wrap any `NoiseFn<f64, 2>` and are themselves `NoiseFn<f64, 2>`,
//! so they nest freely: `Tesselation::new(scale(OpenSimplex::new(seed), f), w, h)`.
//! Scaling is the noise crate's own `ScalePoint` under a shorter name.

use noise::{NoiseFn, ScalePoint};

/// Makes an aperiodic source periodic over one `width x height` tile.
///
/// The value at `(x, y)` is a bilinear blend of the source at the four lattice
/// translations `(x, y)`, `(x - width, y)`, `(x, y - height)` and
/// `(x - width, y - height)`. At `x = width` the blend lands exactly on the
/// value at `x = 0`, and likewise for `y`, so the seam disappears as long as
/// queries stay inside `[0, width) x [0, height)`.
#[derive(Clone, Debug)]
pub struct Tesselation<S> {
    source: S,
    width: f64,
    height: f64,
}

impl<S> Tesselation<S> {
    pub fn new(source: S, width: f64, height: f64) -> Self {
        Self {
            source,
            width,
            height,
        }
    }
}

impl<S: NoiseFn<f64, 2>> NoiseFn<f64, 2> for Tesselation<S> {
    fn get(&self, point: [f64; 2]) -> f64 {
        let [x, y] = point;
        let (w, h) = (self.width, self.height);
        let fx = x / w;
        let fy = y / h;

        let a = self.source.get([x, y]);
        let b = self.source.get([x - w, y]);
        let ab = a * (1.0 - fx) + b * fx;

        let c = self.source.get([x, y - h]);
        let d = self.source.get([x - w, y - h]);
        let cd = c * (1.0 - fx) + d * fx;

        ab * (1.0 - fy) + cd * fy
    }
}

/// Resamples a source at a different spatial frequency.
pub type Scale<S> = ScalePoint<S>;

/// `source` sampled at `factor` times its coordinates on both axes.
pub fn scale<S>(source: S, factor: f64) -> Scale<S> {
    ScalePoint::new(source).set_scale(factor)
}
