//! Document-structure and segmentation-search core.
//!
//! This crate owns the page/block/row/word hierarchy, the chain-coded
//! and polygonal outline representations, the chopping/seam machinery
//! that explores alternative blob groupings, the ratings matrix and
//! params-model scoring that pick among them, and the superscript fix
//! and word-result assembly passes that sit downstream of recognition.
//!
//! It does not perform image binarization, layout analysis, or
//! character classification itself — those are external collaborators,
//! named here only by the interfaces this core calls
//! ([`choice::BlobClassifier`]).

pub mod associate;
pub mod choice;
pub mod chop;
pub mod config;
pub mod containers;
pub mod denorm;
pub mod error;
pub mod geometry;
pub mod outline;
pub mod params_model;
pub mod polyapprox;
pub mod ratings;
pub mod reject;
pub mod superscript;
pub mod tess;
pub mod units;
pub mod word_result;

pub use choice::{BlobChoice, BlobClassifier, RawChoice, WordChoice};
pub use config::DocStructConfig;
pub use denorm::{Denorm, DenormStage};
pub use error::{DocStructError, Result};
pub use geometry::{Box, FPoint, IPoint, Rotation};
pub use ratings::{MatrixCoord, RatingsMatrix};
pub use reject::{RejFlag, Rejection, RejectMap};
pub use units::{BaselineSpline, Block, BlockPolygon, Row, Werd, WerdFlags};
pub use word_result::{BoxWord, WordResult};
