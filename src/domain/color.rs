// Display color mapping for field strength
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl DisplayColor {
    /// Used for strengths that cannot be placed on the scale (NaN).
    pub const TRANSPARENT: DisplayColor = DisplayColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

type Anchors = &'static [(f64, f64)];

/// Piecewise-linear "jet" color map (dark blue -> cyan -> yellow -> dark red).
pub struct Jet;

const JET_RED: Anchors = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: Anchors = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: Anchors = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

impl Jet {
    /// Sample the map at `t`, clamped to `[0, 1]`.
    pub fn sample(t: f64) -> DisplayColor {
        let t = t.clamp(0.0, 1.0);
        DisplayColor::opaque(
            interpolate(JET_RED, t),
            interpolate(JET_GREEN, t),
            interpolate(JET_BLUE, t),
        )
    }
}

fn interpolate(anchors: Anchors, t: f64) -> f64 {
    for pair in anchors.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            let span = x1 - x0;
            if span <= 0.0 {
                return y1;
            }
            return y0 + (y1 - y0) * (t - x0) / span;
        }
    }
    anchors.last().map(|&(_, y)| y).unwrap_or(0.0)
}

/// Clamped linear normalization of strength into the color map's domain.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn normalize(&self, strength: f64) -> f64 {
        ((strength - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    pub fn color_for(&self, strength: f64) -> DisplayColor {
        if strength.is_nan() {
            return DisplayColor::TRANSPARENT;
        }
        Jet::sample(self.normalize(strength))
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(0.0, 150.0)
    }
}
