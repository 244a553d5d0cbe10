use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_train_split() -> String {
    "train".to_string()
}

fn default_test_split() -> String {
    "test".to_string()
}

/// Configuration for one dataset entry. The `dataset` field is the key into
/// the preprocessing registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetConfig {
    pub dataset: String,
    #[serde(default = "default_train_split")]
    pub train_split: String,
    #[serde(default = "default_test_split")]
    pub test_split: String,
    /// Directory holding one data file per split ({split}.parquet or {split}.csv).
    pub data_dir: PathBuf,
    /// When set, rows whose prompt exceeds this token count are dropped.
    #[serde(default)]
    pub max_input_tokens: Option<usize>,
}

impl DatasetConfig {
    /// Pick the split field to hand to the preprocessing function: the train
    /// split for `"train"`, the test split for anything else.
    pub fn split_name(&self, split: &str) -> &str {
        if split == "train" {
            &self.train_split
        } else {
            &self.test_split
        }
    }

    /// Load a config from a YAML or JSON file, chosen by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset config: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        // serde_path_to_error reports the offending field path on parse failure
        let config = if is_json {
            let mut deserializer = serde_json::Deserializer::from_str(&content);
            serde_path_to_error::deserialize(&mut deserializer)
                .with_context(|| format!("Failed to parse dataset config: {}", path.display()))?
        } else {
            let deserializer = serde_yaml::Deserializer::from_str(&content);
            serde_path_to_error::deserialize(deserializer)
                .with_context(|| format!("Failed to parse dataset config: {}", path.display()))?
        };

        Ok(config)
    }
}
