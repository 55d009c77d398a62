//! Chain-coded and polygonal outline representations and the blobs that
//! own them (§3.2).

pub mod chain;
pub mod poly;

pub use chain::{CBlob, COutline, ChainStep, EdgeOffset, MAX_OUTLINE_STEPS};
pub use poly::{Outline, PBlob, PolyPoint};
