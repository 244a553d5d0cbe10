// Dataset preprocessing registry - main dispatch entry point
// Maps dataset identifiers to their preprocessing functions and resolves the
// effective split before delegating.

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::LazyFrame;
use tracing::debug;

use crate::error::DispatchError;
use crate::model::DatasetConfig;
use crate::preproc::ScientificPapers;
use crate::tokenizer::Tokenizer;

/// Split used when the caller has no preference.
pub const DEFAULT_SPLIT: &str = "train";

/// Contract for every registry entry: receives the config, the tokenizer
/// (unexamined by the dispatcher), and the already-resolved split name.
pub trait Preprocess: Send + Sync {
    fn preprocess(
        &self,
        config: &DatasetConfig,
        tokenizer: &dyn Tokenizer,
        split: &str,
    ) -> Result<LazyFrame>;
}

type Registry = HashMap<&'static str, Box<dyn Preprocess>>;

lazy_static::lazy_static! {
    static ref DATASET_PREPROC: Registry = {
        let mut registry: Registry = HashMap::new();
        registry.insert("scientific_papers_dataset", Box::new(ScientificPapers));
        registry
    };
}

/// Dataset identifiers currently wired into the registry, sorted.
pub fn registered_datasets() -> Vec<&'static str> {
    sorted_keys(&DATASET_PREPROC)
}

/// Resolve `dataset_config.dataset` against the registry and invoke the
/// matching preprocessing function with the effective split.
///
/// Fails with [`DispatchError::UnsupportedDataset`] before any delegation when
/// the dataset is not registered; every other error comes from the delegated
/// preprocessing function and propagates unchanged.
pub fn get_preprocessed_dataset(
    tokenizer: &dyn Tokenizer,
    dataset_config: &DatasetConfig,
    split: &str,
) -> Result<LazyFrame> {
    dispatch(&DATASET_PREPROC, tokenizer, dataset_config, split)
}

fn dispatch(
    registry: &Registry,
    tokenizer: &dyn Tokenizer,
    dataset_config: &DatasetConfig,
    split: &str,
) -> Result<LazyFrame> {
    let preproc = registry
        .get(dataset_config.dataset.as_str())
        .ok_or_else(|| DispatchError::UnsupportedDataset {
            dataset: dataset_config.dataset.clone(),
            registered: sorted_keys(registry),
        })?;

    let effective_split = dataset_config.split_name(split);
    debug!(
        dataset = %dataset_config.dataset,
        split = %effective_split,
        "dispatching dataset preprocessing"
    );

    preproc.preprocess(dataset_config, tokenizer, effective_split)
}

fn sorted_keys(registry: &Registry) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = registry.keys().copied().collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use polars::prelude::*;

    struct CountingTokenizer;

    impl Tokenizer for CountingTokenizer {
        fn encode(&self, text: &str) -> Vec<u32> {
            text.split_whitespace().map(|w| w.len() as u32).collect()
        }
    }

    /// Records every invocation instead of touching any data.
    struct RecordingPreprocess {
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Preprocess for RecordingPreprocess {
        fn preprocess(
            &self,
            config: &DatasetConfig,
            _tokenizer: &dyn Tokenizer,
            split: &str,
        ) -> Result<LazyFrame> {
            self.calls
                .lock()
                .unwrap()
                .push((config.dataset.clone(), split.to_string()));
            Ok(df! { "split" => [split] }?.lazy())
        }
    }

    fn recording_registry() -> (Registry, Arc<Mutex<Vec<(String, String)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry: Registry = HashMap::new();
        registry.insert(
            "scientific_papers_dataset",
            Box::new(RecordingPreprocess {
                calls: Arc::clone(&calls),
            }),
        );
        (registry, calls)
    }

    fn config_for(dataset: &str) -> DatasetConfig {
        DatasetConfig {
            dataset: dataset.to_string(),
            train_split: "train_rows".to_string(),
            test_split: "test_rows".to_string(),
            data_dir: PathBuf::from("/tmp/unused"),
            max_input_tokens: None,
        }
    }

    #[test]
    fn registered_key_invokes_the_registered_callable() {
        let (registry, calls) = recording_registry();
        let config = config_for("scientific_papers_dataset");

        dispatch(&registry, &CountingTokenizer, &config, "train").unwrap();

        let recorded = calls.lock().unwrap();
        assert_eq!(
            *recorded,
            vec![(
                "scientific_papers_dataset".to_string(),
                "train_rows".to_string()
            )]
        );
    }

    #[test]
    fn train_split_selected_only_for_exact_train() {
        let (registry, calls) = recording_registry();
        let config = config_for("scientific_papers_dataset");

        for split in ["test", "validation", "TRAIN", "eval", ""] {
            dispatch(&registry, &CountingTokenizer, &config, split).unwrap();
        }

        let recorded = calls.lock().unwrap();
        assert!(recorded.iter().all(|(_, split)| split == "test_rows"));
        assert_eq!(recorded.len(), 5);
    }

    #[test]
    fn default_split_resolves_to_train_split() {
        let (registry, calls) = recording_registry();
        let config = config_for("scientific_papers_dataset");

        dispatch(&registry, &CountingTokenizer, &config, DEFAULT_SPLIT).unwrap();

        assert_eq!(calls.lock().unwrap()[0].1, "train_rows");
    }

    #[test]
    fn unknown_dataset_fails_before_any_invocation() {
        let (registry, calls) = recording_registry();
        let config = config_for("unknown_ds");

        // LazyFrame has no Debug impl, so unwrap_err is unavailable here.
        let err = dispatch(&registry, &CountingTokenizer, &config, "train")
            .err()
            .unwrap();

        assert!(err.to_string().contains("unknown_ds"), "got: {err}");
        assert!(err.to_string().contains("not (yet) implemented"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_dataset_fails_regardless_of_split() {
        let (registry, _calls) = recording_registry();
        let config = config_for("unknown_ds");

        for split in ["train", "test", "validation"] {
            let err = dispatch(&registry, &CountingTokenizer, &config, split)
                .err()
                .unwrap();
            assert!(err.downcast_ref::<DispatchError>().is_some());
        }
    }

    #[test]
    fn dispatch_is_idempotent_for_pure_callables() {
        let (registry, _calls) = recording_registry();
        let config = config_for("scientific_papers_dataset");

        let first = dispatch(&registry, &CountingTokenizer, &config, "validation")
            .unwrap()
            .collect()
            .unwrap();
        let second = dispatch(&registry, &CountingTokenizer, &config, "validation")
            .unwrap()
            .collect()
            .unwrap();

        assert_eq!(split_values(&first), split_values(&second));
        assert_eq!(split_values(&first), vec!["test_rows"]);
    }

    fn split_values(frame: &DataFrame) -> Vec<String> {
        frame
            .column("split")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn static_registry_lists_scientific_papers() {
        assert_eq!(registered_datasets(), vec!["scientific_papers_dataset"]);
    }
}
