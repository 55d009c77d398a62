//! Classifier choice lists and word hypotheses (§6.4, §3.6).
//!
//! `BlobChoice` is the exact shape the external blob classifier returns;
//! everything downstream (the ratings matrix, segmentation search, params
//! model) consumes it by value. `WordChoice` bundles one choice per
//! recognized position, parallel to `WordResult::best_state`.

use crate::tess::TBlob;

/// One classifier hypothesis for a single blob (or merged run of chopped
/// blobs). Rating is smaller-is-better; certainty is larger-is-better
/// (typically negative).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobChoice {
    pub unichar_id: i32,
    pub rating: f32,
    pub certainty: f32,
    pub fontinfo_id: i16,
    pub fontinfo_id2: i16,
    pub script_id: i32,
    pub xgap_before: i16,
    pub xgap_after: i16,
    pub min_xheight: i16,
    pub max_xheight: i16,
    pub adapted: bool,
}

impl BlobChoice {
    pub fn new(unichar_id: i32, rating: f32, certainty: f32) -> Self {
        BlobChoice {
            unichar_id,
            rating,
            certainty,
            fontinfo_id: -1,
            fontinfo_id2: -1,
            script_id: 0,
            xgap_before: 0,
            xgap_after: 0,
            min_xheight: 0,
            max_xheight: 0,
            adapted: false,
        }
    }
}

/// The external blob classifier contract (§6.4). Implementors return a
/// non-empty, best-first choice list for a well-formed blob; an empty
/// vector signals recognition failure for that blob.
///
/// `suppress_y_penalty` lets the superscript/subscript fix (§4.7)
/// re-invoke the classifier with its y-position penalty zeroed without
/// widening the contract for every other caller.
pub trait BlobClassifier {
    fn classify(&self, blob: &TBlob, suppress_y_penalty: bool) -> Vec<BlobChoice>;
}

/// A recognized word hypothesis: one [`BlobChoice`] per final position,
/// parallel to `WordResult::best_state`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordChoice {
    pub choices: Vec<BlobChoice>,
}

impl WordChoice {
    pub fn empty() -> Self {
        WordChoice::default()
    }

    pub fn length(&self) -> usize {
        self.choices.len()
    }

    /// Total rating across all positions, the quantity the params-model
    /// cost is multiplicative with (by outline length) when comparing
    /// hypotheses of different length.
    pub fn rating(&self) -> f32 {
        self.choices.iter().map(|c| c.rating).sum()
    }

    /// The single worst (most negative) per-position certainty, or
    /// `f32::INFINITY` for an empty word.
    pub fn worst_certainty(&self) -> f32 {
        self.choices
            .iter()
            .map(|c| c.certainty)
            .fold(f32::INFINITY, f32::min)
    }

    pub fn unichar_ids(&self) -> Vec<i32> {
        self.choices.iter().map(|c| c.unichar_id).collect()
    }
}

/// The top classifier hypothesis per chopped-blob position, kept
/// alongside the best choice for diagnostics (§3.6).
pub type RawChoice = Vec<BlobChoice>;
