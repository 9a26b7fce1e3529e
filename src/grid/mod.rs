//! Grid geometry: normalization, shape selection, cell lattice and the final
//! ordered layout.

mod lattice;
pub mod materialize;
pub mod normalize;
pub mod sizer;

pub use lattice::{GridPosition, GridShape, Lattice};
pub use materialize::{materialize, GridResult};
pub use normalize::{normalize_by_span, AxisSpan};
pub use sizer::{excess_kurtosis, minimal_square, BiasRounding, GridSizer, KurtosisBias, ShapeBias, SquareBias};
