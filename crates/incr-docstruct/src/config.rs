//! On-disk configuration for the document-structure core.
//!
//! Follows the `#[serde(default)]` + per-field `Default` pattern used by
//! `OcrConfig`/`ExtractionConfig` in the surrounding workspace.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DocStructError, Result};

/// Every numeric tunable named by the specification, collected into one
/// serializable config so callers can load/override them from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocStructConfig {
    /// Tuning constant for `cutline`'s perpendicular-deviation decision
    /// in the polygonal approximator.
    pub approx_dist: f32,

    /// Fraction of the baseline-normalized x-height band above which a
    /// blob's bottom edge marks it a superscript candidate.
    pub superscript_min_y_bottom: f32,

    /// Fraction of the baseline-normalized x-height band below which a
    /// blob's top edge marks it a subscript candidate.
    pub subscript_max_y_top: f32,

    /// Multiplier applied to the average normal-blob certainty to derive
    /// the "unlikely" certainty threshold for superscript/subscript
    /// outlier detection.
    pub superscript_worse_certainty: f32,

    /// Multiplier applied to a run's original certainty; a re-recognized
    /// super/subscript character must beat `original * this` to be
    /// accepted.
    pub superscript_bettered_certainty: f32,

    /// Minimum fraction of expected glyph height a re-recognized
    /// super/subscript character must retain to be accepted.
    pub superscript_scaledown_ratio: f32,

    /// Width/height ratio ceiling above which a candidate segmentation is
    /// flagged as a bad shape.
    pub max_char_wh_ratio: f32,

    /// Opaque "pit-sync projection fix" tunable, carried over from the
    /// legacy engine without further interpretation (see spec §9).
    pub pitsync_fix: bool,

    /// Opaque "xht fixup" reject-mode tunable, carried over from the
    /// legacy engine without further interpretation (see spec §9).
    pub xht_fixup: bool,
}

impl Default for DocStructConfig {
    fn default() -> Self {
        Self {
            approx_dist: 15.0,
            superscript_min_y_bottom: 0.6,
            subscript_max_y_top: 0.4,
            superscript_worse_certainty: 2.0,
            superscript_bettered_certainty: 1.0,
            superscript_scaledown_ratio: 0.6,
            max_char_wh_ratio: 2.0,
            pitsync_fix: false,
            xht_fixup: false,
        }
    }
}

impl DocStructConfig {
    /// Loads configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DocStructError::Config(format!("invalid config JSON: {e}")))
    }

    /// Saves configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocStructError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
