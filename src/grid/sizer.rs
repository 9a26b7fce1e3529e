//! Grid shape selection.
//!
//! The smallest square that holds every point is the starting shape. A
//! [`ShapeBias`] may then widen either axis; the default bias grows an axis in
//! proportion to the excess kurtosis of the points along it, giving
//! sharply peaked distributions more room on that axis.

use crate::grid::GridShape;
use log::debug;
use serde::{Deserialize, Serialize};

/// Strategy that adds extra columns and rows to the minimal square.
///
/// Implementations only ever grow the grid, so the square bound still holds.
pub trait ShapeBias: Send + Sync {
    /// Returns `(extra_columns, extra_rows)` for the given normalized points.
    ///
    /// Called only when there are at least two points.
    fn bias(&self, points: &[[f64; 2]]) -> (usize, usize);
}

/// Keeps the minimal square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquareBias;

impl ShapeBias for SquareBias {
    fn bias(&self, _points: &[[f64; 2]]) -> (usize, usize) {
        (0, 0)
    }
}

/// How a scaled kurtosis value is turned into a whole number of cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasRounding {
    /// `ceil(|k| * scale)`.
    #[default]
    CeilOfAbs,
    /// `|ceil(k * scale)|`. Rounds negative kurtosis toward zero first, so
    /// flat distributions get one cell less than with [`BiasRounding::CeilOfAbs`].
    AbsOfCeil,
}

impl BiasRounding {
    /// Applies the rounding to an already scaled kurtosis value.
    #[inline]
    pub fn apply(&self, scaled: f64) -> usize {
        if !scaled.is_finite() {
            return 0;
        }
        let cells = match self {
            BiasRounding::CeilOfAbs => scaled.abs().ceil(),
            BiasRounding::AbsOfCeil => scaled.ceil().abs(),
        };
        cells as usize
    }
}

/// Grows each axis by its scaled excess kurtosis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KurtosisBias {
    /// Multiplier applied to the kurtosis before rounding.
    /// Default: 2.0.
    pub scale: f64,
    /// Rounding policy.
    /// Default: ceiling of the absolute value.
    pub rounding: BiasRounding,
}

impl Default for KurtosisBias {
    fn default() -> Self {
        Self {
            scale: 2.0,
            rounding: BiasRounding::CeilOfAbs,
        }
    }
}

impl ShapeBias for KurtosisBias {
    fn bias(&self, points: &[[f64; 2]]) -> (usize, usize) {
        let kurt_x = excess_kurtosis(points.iter().map(|p| p[0]));
        let kurt_y = excess_kurtosis(points.iter().map(|p| p[1]));
        let bias = (
            self.rounding.apply(kurt_x * self.scale),
            self.rounding.apply(kurt_y * self.scale),
        );
        debug!(
            "Kurtosis x={:.4}, y={:.4} -> bias {:?}",
            kurt_x, kurt_y, bias
        );
        bias
    }
}

/// Excess (Fisher) kurtosis using population moments: `m4 / m2^2 - 3`.
///
/// Returns 0 for fewer than two values or when the variance is zero.
pub fn excess_kurtosis<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let values = values.into_iter();
    let (count, sum) = values
        .clone()
        .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count < 2 {
        return 0.0;
    }

    let n = count as f64;
    let mean = sum / n;
    let (m2, m4) = values.fold((0.0, 0.0), |(m2, m4), v| {
        let d = v - mean;
        let d2 = d * d;
        (m2 + d2, m4 + d2 * d2)
    });
    let m2 = m2 / n;
    let m4 = m4 / n;

    if m2 <= f64::MIN_POSITIVE {
        return 0.0;
    }
    m4 / (m2 * m2) - 3.0
}

/// Side of the smallest square with at least `points` cells, never below 1.
pub fn minimal_square(points: usize) -> usize {
    if points <= 1 {
        return 1;
    }
    let mut side = (points as f64).sqrt() as usize;
    while side * side < points {
        side += 1;
    }
    while side > 1 && (side - 1) * (side - 1) >= points {
        side -= 1;
    }
    side
}

/// Chooses a grid shape for a set of normalized points.
pub struct GridSizer {
    bias: Box<dyn ShapeBias>,
}

impl Default for GridSizer {
    fn default() -> Self {
        Self::new(KurtosisBias::default())
    }
}

impl std::fmt::Debug for GridSizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSizer").finish_non_exhaustive()
    }
}

impl GridSizer {
    /// Creates a sizer with the given shape bias.
    pub fn new<B: ShapeBias + 'static>(bias: B) -> Self {
        Self {
            bias: Box::new(bias),
        }
    }

    /// Returns a shape with at least `points.len()` cells.
    ///
    /// With `use_default_square`, or fewer than two points, the bias is
    /// skipped and the minimal square is returned.
    pub fn size(&self, points: &[[f64; 2]], use_default_square: bool) -> GridShape {
        let side = minimal_square(points.len());
        let mut shape = GridShape::square(side);

        if use_default_square || points.len() < 2 {
            debug!("Using minimal square grid {}x{}", side, side);
            return shape;
        }

        let (extra_x, extra_y) = self.bias.bias(points);
        shape.size_x = shape.size_x.saturating_add(extra_x);
        shape.size_y = shape.size_y.saturating_add(extra_y);

        debug!(
            "Grid shape {}x{} for {} points",
            shape.size_x,
            shape.size_y,
            points.len()
        );
        shape
    }
}
