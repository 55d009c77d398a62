//! The chopped working representation (`TWerd` of `TBlob` of `TessLine` of
//! `EdgePoint` loops), produced from a `Werd` and consumed by chopping,
//! the ratings matrix, and segmentation evaluation.

pub mod edge_point;

pub use edge_point::{EdgePoint, TBlob, TWerd, TessLine};
