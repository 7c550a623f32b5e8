use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::char_diff::SimilarCharDiff;

/// Character-level diff algorithm used for string leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<DiffAlgorithm> for similar::Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => similar::Algorithm::Myers,
            DiffAlgorithm::Patience => similar::Algorithm::Patience,
            DiffAlgorithm::Lcs => similar::Algorithm::Lcs,
        }
    }
}

/// Configuration for the character-level diff engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharDiffConfig {
    /// Which diff algorithm to run over the characters of both strings.
    pub algorithm: DiffAlgorithm,
    /// Upper bound on diff time; past it the engine settles for a coarser
    /// (still correct) result.
    pub timeout: Option<Duration>,
    /// Characters of unchanged context kept around each patch.
    pub context: usize,
    /// Fold short unchanged runs into the surrounding edits so that
    /// unrelated words are replaced whole instead of letter by letter.
    pub semantic_cleanup: bool,
}

impl Default for CharDiffConfig {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithm::Myers,
            timeout: Some(Duration::from_secs(1)),
            context: 4,
            semantic_cleanup: true,
        }
    }
}

/// Top-level diff configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// When `false`, changed strings are replaced whole.
    pub string_patching: bool,
    /// Settings for the character-level engine.
    pub char_diff: CharDiffConfig,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            string_patching: true,
            char_diff: CharDiffConfig::default(),
        }
    }
}

impl DiffConfig {
    /// A configuration that never patches strings in place.
    pub fn whole_values() -> Self {
        Self {
            string_patching: false,
            ..Default::default()
        }
    }

    /// Build the character diff engine this configuration asks for, if any.
    pub fn char_diff(&self) -> Option<SimilarCharDiff> {
        self.string_patching
            .then(|| SimilarCharDiff::new(self.char_diff.clone()))
    }
}
