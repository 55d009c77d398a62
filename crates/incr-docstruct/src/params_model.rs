//! Params-model scoring: a learned linear cost over a fixed feature
//! vector (§4.6, §6.3). Mirrors `classify/params_model.h`/`.cpp`
//! (`ParamsModel`).

use std::collections::HashMap;
use std::path::Path;

use crate::error::{DocStructError, Result};

/// The fixed feature enumeration named by the interface. Order within the
/// file is not significant, but every name must be present.
pub const FEATURE_NAMES: [&str; 15] = [
    "DICT_MATCH_TYPE",
    "UNAMBIG_DICT_MATCH",
    "SHAPE_COST",
    "NGRAM_PROB",
    "NUM_BAD_PUNC",
    "NUM_BAD_CASE",
    "NUM_BAD_CHAR_TYPE",
    "NUM_BAD_SPACING",
    "NUM_BAD_SCRIPT",
    "NUM_BAD_FONT",
    "WORST_CERT",
    "RATING",
    "ADAPTED",
    "NUM_UNICHARS",
    "OUTLINE_LEN",
];

pub const NUM_FEATURES: usize = FEATURE_NAMES.len();

/// A dense feature vector, one entry per name in [`FEATURE_NAMES`] (same
/// index order).
pub type FeatureVector = [f32; NUM_FEATURES];

/// Cost-scale factor dividing the raw weighted sum.
pub const COST_SCALE: f32 = 100.0;
pub const COST_MIN: f32 = 0.001;
pub const COST_MAX: f32 = 100.0;

/// Which of the two supported scoring passes a weight vector belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPass {
    Adapted,
    NonAdapted,
}

impl ModelPass {
    fn label(self) -> &'static str {
        match self {
            ModelPass::Adapted => "adapted",
            ModelPass::NonAdapted => "non_adapted",
        }
    }
}

/// A per-language, per-pass weight vector plus the linear-cost evaluator.
#[derive(Debug, Clone, Default)]
pub struct ParamsModel {
    adapted: Option<FeatureVector>,
    non_adapted: Option<FeatureVector>,
}

impl ParamsModel {
    pub fn new() -> Self {
        ParamsModel::default()
    }

    fn slot(&self, pass: ModelPass) -> Option<&FeatureVector> {
        match pass {
            ModelPass::Adapted => self.adapted.as_ref(),
            ModelPass::NonAdapted => self.non_adapted.as_ref(),
        }
    }

    pub fn is_initialized(&self, pass: ModelPass) -> bool {
        self.slot(pass).is_some()
    }

    /// `cost = clamp(-sum(w_i * f_i) / 100, 0.001, 100)`. Returns `None`
    /// if `pass` was never successfully loaded; callers must not invoke
    /// this for an uninitialized pass (§7).
    pub fn compute_cost(&self, pass: ModelPass, features: &FeatureVector) -> Option<f32> {
        let weights = self.slot(pass)?;
        let dot: f32 = weights.iter().zip(features.iter()).map(|(w, f)| w * f).sum();
        Some((-dot / COST_SCALE).clamp(COST_MIN, COST_MAX))
    }

    /// Replaces `pass`'s weights from a plain-text file: one
    /// `NAME value` pair per non-comment (`#`-prefixed) line. Every name
    /// in [`FEATURE_NAMES`] must be present, or the pass is left
    /// untouched and an error is returned.
    pub fn load(&mut self, pass: ModelPass, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        let mut values: HashMap<&str, f32> = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let name = parts.next().ok_or_else(|| DocStructError::ParamsModelLoad {
                pass: pass.label(),
                reason: format!("unparseable line: {line:?}"),
            })?;
            let value_str = parts.next().ok_or_else(|| DocStructError::ParamsModelLoad {
                pass: pass.label(),
                reason: format!("line {line:?} is missing a value"),
            })?;
            let value: f32 = value_str.parse().map_err(|_| DocStructError::ParamsModelLoad {
                pass: pass.label(),
                reason: format!("unparseable value {value_str:?} for {name}"),
            })?;
            values.insert(name, value);
        }

        let mut weights: FeatureVector = [0.0; NUM_FEATURES];
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            match values.get(name) {
                Some(&v) => weights[i] = v,
                None => {
                    return Err(DocStructError::ParamsModelLoad {
                        pass: pass.label(),
                        reason: format!("missing feature {name}"),
                    })
                }
            }
        }

        match pass {
            ModelPass::Adapted => self.adapted = Some(weights),
            ModelPass::NonAdapted => self.non_adapted = Some(weights),
        }
        Ok(())
    }

    /// Writes `pass`'s weights, one `NAME value` pair per line.
    pub fn save(&self, pass: ModelPass, path: &Path) -> Result<()> {
        let weights = self.slot(pass).ok_or_else(|| DocStructError::ParamsModelLoad {
            pass: pass.label(),
            reason: "pass is uninitialized".to_string(),
        })?;
        let mut out = String::new();
        for (name, w) in FEATURE_NAMES.iter().zip(weights.iter()) {
            out.push_str(&format!("{name} {w}\n"));
        }
        std::fs::write(path, out)?;
        Ok(())
    }

    /// Elementwise-equal within `1e-4`. Two uninitialized passes are
    /// equivalent; an initialized and an uninitialized pass are not.
    pub fn equivalent(&self, pass: ModelPass, other: &ParamsModel) -> bool {
        match (self.slot(pass), other.slot(pass)) {
            (Some(a), Some(b)) => a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4),
            (None, None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_zero_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join(format!("params-model-test-{}.txt", std::process::id()));
        let mut contents = String::new();
        for name in FEATURE_NAMES {
            contents.push_str(&format!("{name} 0.0\n"));
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn zero_weights_clamp_cost_to_minimum() {
        let mut model = ParamsModel::new();
        let dir = std::env::temp_dir();
        let path = all_zero_file(&dir);
        model.load(ModelPass::NonAdapted, &path).unwrap();
        let features: FeatureVector = [1.0; NUM_FEATURES];
        assert_eq!(
            model.compute_cost(ModelPass::NonAdapted, &features),
            Some(COST_MIN)
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_feature_leaves_pass_uninitialized() {
        let mut model = ParamsModel::new();
        let dir = std::env::temp_dir();
        let path = dir.join(format!("params-model-bad-{}.txt", std::process::id()));
        std::fs::write(&path, "DICT_MATCH_TYPE 1.0\n").unwrap();
        assert!(model.load(ModelPass::Adapted, &path).is_err());
        assert!(!model.is_initialized(ModelPass::Adapted));
        let features: FeatureVector = [0.0; NUM_FEATURES];
        assert!(model.compute_cost(ModelPass::Adapted, &features).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_load_round_trip_is_equivalent() {
        let mut model = ParamsModel::new();
        let dir = std::env::temp_dir();
        let path = all_zero_file(&dir);
        model.load(ModelPass::Adapted, &path).unwrap();

        let save_path = dir.join(format!("params-model-saved-{}.txt", std::process::id()));
        model.save(ModelPass::Adapted, &save_path).unwrap();

        let mut reloaded = ParamsModel::new();
        reloaded.load(ModelPass::Adapted, &save_path).unwrap();
        assert!(model.equivalent(ModelPass::Adapted, &reloaded));

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&save_path);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut model = ParamsModel::new();
        let dir = std::env::temp_dir();
        let path = dir.join(format!("params-model-comments-{}.txt", std::process::id()));
        let mut contents = String::from("# a comment\n\n");
        for name in FEATURE_NAMES {
            contents.push_str(&format!("{name} 2.0\n"));
        }
        std::fs::write(&path, contents).unwrap();
        assert!(model.load(ModelPass::NonAdapted, &path).is_ok());
        let _ = std::fs::remove_file(&path);
    }
}
