//! Reject map (§10.5), supplementing the distilled spec from
//! `original_source/ccstruct/rejctmap.h`. Tracks every reject/accept call
//! made against each character position of a word, in call order, and
//! derives current accept/reject status from that history.

/// One recorded reject/accept call. The "PERM" group in the legacy enum
/// (tess failure, too-small x-height, too-close-to-edge, 1/I/l confusion,
/// odd blob, matrix-match rejection) is permanent: once set, no later
/// accept call can undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejFlag {
    TessFailure,
    TooSmallXHeight,
    TooCloseToEdge,
    AmbiguousOneIL,
    OddBlob,
    MatrixMismatch,
    Hyphen,
    DocRejected,
    Accept,
}

impl RejFlag {
    /// Permanent flags can never be overridden by a later accept.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            RejFlag::TessFailure
                | RejFlag::TooSmallXHeight
                | RejFlag::TooCloseToEdge
                | RejFlag::AmbiguousOneIL
                | RejFlag::OddBlob
                | RejFlag::MatrixMismatch
        )
    }

    pub fn is_accept(self) -> bool {
        matches!(self, RejFlag::Accept)
    }
}

/// The reject/accept call history for one character position.
#[derive(Debug, Clone, Default)]
pub struct Rejection {
    flags: Vec<RejFlag>,
}

impl Rejection {
    pub fn new() -> Self {
        Rejection::default()
    }

    pub fn record(&mut self, flag: RejFlag) {
        self.flags.push(flag);
    }

    pub fn history(&self) -> &[RejFlag] {
        &self.flags
    }

    /// Accepted iff no permanent flag was ever recorded, and either no
    /// flag at all was recorded, or the chronologically last flag is an
    /// accept flag.
    pub fn is_accepted(&self) -> bool {
        if self.flags.iter().any(|f| f.is_permanent()) {
            return false;
        }
        match self.flags.last() {
            None => true,
            Some(f) => f.is_accept(),
        }
    }
}

/// One [`Rejection`] per character position of a word, parallel to
/// `WordResult::best_choice`.
#[derive(Debug, Clone, Default)]
pub struct RejectMap {
    entries: Vec<Rejection>,
}

impl RejectMap {
    pub fn new(len: usize) -> Self {
        RejectMap {
            entries: vec![Rejection::new(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reject(&mut self, idx: usize, flag: RejFlag) {
        self.entries[idx].record(flag);
    }

    pub fn accept(&mut self, idx: usize) {
        self.entries[idx].record(RejFlag::Accept);
    }

    pub fn is_accepted(&self, idx: usize) -> bool {
        self.entries[idx].is_accepted()
    }

    pub fn accepted_count(&self) -> usize {
        self.entries.iter().filter(|r| r.is_accepted()).count()
    }

    /// Merges position `idx + 1` into `idx` (call history concatenated in
    /// order), for use by `WordResult::conditional_blob_merge`.
    pub fn merge(&mut self, idx: usize) {
        let next = self.entries.remove(idx + 1);
        self.entries[idx].flags.extend(next.flags);
    }

    pub fn insert(&mut self, idx: usize, rejection: Rejection) {
        self.entries.insert(idx, rejection);
    }
}
