//! Per-axis span normalization.

use serde::{Deserialize, Serialize};

/// Value assigned to every coordinate on an axis whose span is zero.
pub const ZERO_SPAN_VALUE: f64 = 0.0;

/// Observed range of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpan {
    /// Smallest value on the axis.
    pub min: f64,
    /// Largest value on the axis.
    pub max: f64,
}

impl AxisSpan {
    /// Maps `value` into [0, 1]. Zero-span axes map to [`ZERO_SPAN_VALUE`].
    ///
    /// Works on halved values so a span wider than `f64::MAX` stays finite.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        let low = self.min / 2.0;
        let span = self.max / 2.0 - low;
        if span > 0.0 {
            (value / 2.0 - low) / span
        } else {
            ZERO_SPAN_VALUE
        }
    }
}

/// Computes the range of each axis. Returns `None` for an empty input.
pub fn axis_spans<const D: usize>(points: &[[f64; D]]) -> Option<[AxisSpan; D]> {
    let first = points.first()?;
    let mut spans = [AxisSpan { min: 0.0, max: 0.0 }; D];
    for (axis, span) in spans.iter_mut().enumerate() {
        span.min = first[axis];
        span.max = first[axis];
    }

    for point in &points[1..] {
        for (axis, span) in spans.iter_mut().enumerate() {
            span.min = span.min.min(point[axis]);
            span.max = span.max.max(point[axis]);
        }
    }
    Some(spans)
}

/// Rescales every axis independently so its minimum maps to 0 and its
/// maximum to 1.
///
/// The transform is affine and increasing per axis, so ordering along each
/// axis and point identity (position in the slice) are preserved.
pub fn normalize_by_span<const D: usize>(points: &[[f64; D]]) -> Vec<[f64; D]> {
    let Some(spans) = axis_spans(points) else {
        return Vec::new();
    };

    points
        .iter()
        .map(|point| {
            let mut out = [0.0; D];
            for axis in 0..D {
                out[axis] = spans[axis].apply(point[axis]);
            }
            out
        })
        .collect()
}
