//! `Werd`: a sequence of blobs plus flags and a reject list (§3.3).
//!
//! Mirrors `ccstruct/werd.h` (`WERD`).

use bitflags::bitflags;

use crate::geometry::Box;
use crate::outline::CBlob;

bitflags! {
    /// The legacy 16-bit `WERD` flag field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WerdFlags: u16 {
        const SEGMENTED  = 1 << 0;
        const ITALIC     = 1 << 1;
        const BOL        = 1 << 2;
        const EOL        = 1 << 3;
        const NORMALIZED = 1 << 4;
        const DONT_CHOP  = 1 << 5;
        const REP_CHAR   = 1 << 6;
        const FUZZY_SP   = 1 << 7;
        const FUZZY_NON  = 1 << 8;
        const INVERSE    = 1 << 9;
    }
}

/// A word: a list of non-rejected blobs, a list of rejected blobs, flags,
/// and bookkeeping fields.
#[derive(Debug, Default)]
pub struct Werd {
    pub blobs: Vec<CBlob>,
    pub rejected_blobs: Vec<CBlob>,
    pub flags: WerdFlags,
    pub leading_blanks: u32,
    pub ground_truth_text: Option<String>,
    pub script_id: i32,
}

impl Werd {
    /// Builds a word from blobs each tagged with its own outlines'
    /// invert-polarity vote. Establishes the §3.3 invariant: the word's
    /// `INVERSE` flag is the majority vote across `blob_inverts`, and any
    /// blob dissenting from that vote is moved to the reject list.
    pub fn new(blobs: Vec<CBlob>, blob_inverts: Vec<bool>, script_id: i32) -> Self {
        assert_eq!(blobs.len(), blob_inverts.len());
        let inverted_votes = blob_inverts.iter().filter(|&&v| v).count();
        let majority_inverse = inverted_votes * 2 > blob_inverts.len();

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for (blob, inverted) in blobs.into_iter().zip(blob_inverts) {
            if inverted == majority_inverse {
                accepted.push(blob);
            } else {
                rejected.push(blob);
            }
        }

        let mut flags = WerdFlags::empty();
        flags.set(WerdFlags::INVERSE, majority_inverse);

        Werd {
            blobs: accepted,
            rejected_blobs: rejected,
            flags,
            leading_blanks: 0,
            ground_truth_text: None,
            script_id,
        }
    }

    pub fn bounding_box(&self) -> Box {
        self.blobs
            .iter()
            .map(|b| b.bounding_box())
            .fold(Box::empty(), |acc, b| acc.union(&b))
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_vote_sets_inverse_and_rejects_dissenters() {
        let blobs = vec![CBlob::new(), CBlob::new(), CBlob::new()];
        let inverts = vec![true, true, false];
        let werd = Werd::new(blobs, inverts, 0);
        assert!(werd.flags.contains(WerdFlags::INVERSE));
        assert_eq!(werd.blobs.len(), 2);
        assert_eq!(werd.rejected_blobs.len(), 1);
    }

    #[test]
    fn no_majority_inverse_keeps_non_inverted() {
        let blobs = vec![CBlob::new(), CBlob::new(), CBlob::new()];
        let inverts = vec![false, false, true];
        let werd = Werd::new(blobs, inverts, 0);
        assert!(!werd.flags.contains(WerdFlags::INVERSE));
        assert_eq!(werd.blobs.len(), 2);
        assert_eq!(werd.rejected_blobs.len(), 1);
    }

    #[test]
    fn flag_accessors_round_trip() {
        let mut flags = WerdFlags::empty();
        assert!(!flags.contains(WerdFlags::BOL));
        flags.insert(WerdFlags::BOL | WerdFlags::EOL);
        assert!(flags.contains(WerdFlags::BOL));
        assert!(flags.contains(WerdFlags::EOL));
        flags.set(WerdFlags::BOL, false);
        assert!(!flags.contains(WerdFlags::BOL));
    }
}
