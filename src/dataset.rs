//! Input collection of embeddings and their payloads.

use crate::error::{Result, TesseraError};
use serde::Serialize;

/// A collection of fixed-length feature vectors with one payload each.
///
/// Rows are stored in a flat row-major buffer. The position of a row in the
/// collection is its original index, which the whole pipeline preserves.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset<P> {
    /// Feature vector length shared by every row.
    dim: usize,
    /// Flattened features, `len() == dim * payloads.len()`.
    features: Vec<f64>,
    /// Payload per row.
    payloads: Vec<P>,
}

/// A borrowed view of one dataset row.
#[derive(Debug, Clone, Copy)]
pub struct DataPoint<'a, P> {
    /// Original index in the collection.
    pub index: usize,
    /// Feature vector.
    pub features: &'a [f64],
    /// Associated payload.
    pub payload: &'a P,
}

impl<P> Dataset<P> {
    /// Creates an empty dataset for feature vectors of length `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            features: Vec::new(),
            payloads: Vec::new(),
        }
    }

    /// Creates an empty dataset with room for `capacity` rows.
    pub fn with_capacity(dim: usize, capacity: usize) -> Self {
        Self {
            dim,
            features: Vec::with_capacity(dim * capacity),
            payloads: Vec::with_capacity(capacity),
        }
    }

    /// Builds a dataset from `(features, payload)` rows.
    ///
    /// The dimension is taken from the first row; an empty iterator yields an
    /// empty dataset of dimension 0.
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<f64>, P)>,
    {
        let mut rows = rows.into_iter().peekable();
        let dim = rows.peek().map(|(f, _)| f.len()).unwrap_or(0);
        let mut dataset = Self::with_capacity(dim, rows.size_hint().0);
        for (features, payload) in rows {
            dataset.push(&features, payload)?;
        }
        Ok(dataset)
    }

    /// Appends a row and returns its original index.
    pub fn push(&mut self, features: &[f64], payload: P) -> Result<usize> {
        if features.len() != self.dim {
            return Err(TesseraError::DimensionMismatch {
                expected: self.dim,
                actual: features.len(),
            });
        }
        if let Some(pos) = features.iter().position(|v| !v.is_finite()) {
            return Err(TesseraError::InvalidInput(format!(
                "row {} has a non-finite value at position {}",
                self.payloads.len(),
                pos
            )));
        }

        self.features.extend_from_slice(features);
        self.payloads.push(payload);
        Ok(self.payloads.len() - 1)
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Returns true if the dataset has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Feature vector length.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Feature vector of row `index`.
    #[inline]
    pub fn features(&self, index: usize) -> Option<&[f64]> {
        if index < self.len() {
            let offset = index * self.dim;
            Some(&self.features[offset..offset + self.dim])
        } else {
            None
        }
    }

    /// Payload of row `index`.
    #[inline]
    pub fn payload(&self, index: usize) -> Option<&P> {
        self.payloads.get(index)
    }

    /// All payloads in original order.
    #[inline]
    pub fn payloads(&self) -> &[P] {
        &self.payloads
    }

    /// Row `index` as a [`DataPoint`].
    pub fn get(&self, index: usize) -> Option<DataPoint<'_, P>> {
        Some(DataPoint {
            index,
            features: self.features(index)?,
            payload: self.payloads.get(index)?,
        })
    }

    /// Iterates over rows in original order.
    pub fn iter(&self) -> impl Iterator<Item = DataPoint<'_, P>> {
        self.payloads.iter().enumerate().map(move |(index, payload)| {
            let offset = index * self.dim;
            DataPoint {
                index,
                features: &self.features[offset..offset + self.dim],
                payload,
            }
        })
    }

    /// Borrows the feature matrix without payloads.
    pub fn view(&self) -> FeatureView<'_> {
        FeatureView {
            dim: self.dim,
            rows: self.len(),
            data: &self.features,
        }
    }
}

/// Row-major feature matrix borrowed from a [`Dataset`].
///
/// Projectors only ever see this view, which keeps them independent of the
/// payload type.
#[derive(Debug, Clone, Copy)]
pub struct FeatureView<'a> {
    dim: usize,
    rows: usize,
    data: &'a [f64],
}

impl<'a> FeatureView<'a> {
    /// Wraps a flat row-major buffer.
    pub fn new(data: &'a [f64], dim: usize) -> Result<Self> {
        if dim == 0 || data.len() % dim != 0 {
            if dim == 0 && data.is_empty() {
                return Ok(Self { dim, rows: 0, data });
            }
            return Err(TesseraError::InvalidInput(format!(
                "buffer of {} values is not a whole number of rows of length {}",
                data.len(),
                dim
            )));
        }
        Ok(Self {
            dim,
            rows: data.len() / dim,
            data,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row length.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row `i`. Panics if out of range.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }
}
