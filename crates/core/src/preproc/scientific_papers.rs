//! Scientific-papers summarization preprocessing.
//!
//! Loads the per-split raw data, turns each article/abstract pair into a
//! summarization prompt with its label, and drops rows over the configured
//! token budget.

use std::path::{Path, PathBuf};

use anyhow::Result;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::model::DatasetConfig;
use crate::registry::Preprocess;
use crate::tokenizer::Tokenizer;

const ARTICLE_COLUMN: &str = "article";
const ABSTRACT_COLUMN: &str = "abstract";

const PROMPT_PREFIX: &str = "Summarize the following scientific article:\n\n";
const PROMPT_SUFFIX: &str = "\n\nSummary:\n";

#[derive(Debug, Error)]
pub enum ScientificPapersError {
    #[error(
        "no data for split '{split}' under '{dir}' (expected {split}.parquet or {split}.csv)"
    )]
    SplitNotFound { dir: PathBuf, split: String },
    #[error("Failed to load split data from '{path}'")]
    SplitLoad {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to inspect schema for split '{split}'")]
    SchemaInspection {
        split: String,
        #[source]
        source: PolarsError,
    },
    #[error("Split '{split}' is missing required columns: {missing:?}")]
    MissingColumns { split: String, missing: Vec<String> },
}

pub struct ScientificPapers;

impl Preprocess for ScientificPapers {
    fn preprocess(
        &self,
        config: &DatasetConfig,
        tokenizer: &dyn Tokenizer,
        split: &str,
    ) -> Result<LazyFrame> {
        let path = locate_split_file(&config.data_dir, split)?;
        debug!(split = %split, path = %path.display(), "loading scientific papers split");

        let frame = load_split(&path)?;
        ensure_required_columns(&frame, split)?;

        let prepared = build_prompts(frame, tokenizer)?;
        Ok(apply_token_budget(prepared, config.max_input_tokens))
    }
}

fn locate_split_file(dir: &Path, split: &str) -> Result<PathBuf, ScientificPapersError> {
    let parquet = dir.join(format!("{split}.parquet"));
    if parquet.exists() {
        return Ok(parquet);
    }
    let csv = dir.join(format!("{split}.csv"));
    if csv.exists() {
        return Ok(csv);
    }
    Err(ScientificPapersError::SplitNotFound {
        dir: dir.to_path_buf(),
        split: split.to_string(),
    })
}

fn load_split(path: &Path) -> Result<LazyFrame, ScientificPapersError> {
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

    let loaded = if is_parquet {
        LazyFrame::scan_parquet(path, Default::default())
    } else {
        LazyCsvReader::new(path).finish()
    };

    loaded.map_err(|source| ScientificPapersError::SplitLoad {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_required_columns(frame: &LazyFrame, split: &str) -> Result<(), ScientificPapersError> {
    let schema = frame.clone().collect_schema().map_err(|source| {
        ScientificPapersError::SchemaInspection {
            split: split.to_string(),
            source,
        }
    })?;

    let missing: Vec<String> = [ARTICLE_COLUMN, ABSTRACT_COLUMN]
        .iter()
        .filter(|name| schema.get(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ScientificPapersError::MissingColumns {
            split: split.to_string(),
            missing,
        })
    }
}

/// Materialize the split and derive the prompt, label, and token-count
/// columns. Tokenization happens per row, so this is the point where the
/// frame stops being lazy.
fn build_prompts(frame: LazyFrame, tokenizer: &dyn Tokenizer) -> Result<LazyFrame> {
    let mut materialized = frame.collect()?;

    let row_count = materialized.height();
    let mut prompts = Vec::with_capacity(row_count);
    let mut summaries = Vec::with_capacity(row_count);
    let mut prompt_tokens: Vec<u32> = Vec::with_capacity(row_count);

    {
        let articles = materialized.column(ARTICLE_COLUMN)?.str()?;
        let abstracts = materialized.column(ABSTRACT_COLUMN)?.str()?;

        for (article, summary) in articles.into_iter().zip(abstracts) {
            let article = article.unwrap_or("");
            let summary = summary.unwrap_or("");
            let prompt = format!("{PROMPT_PREFIX}{article}{PROMPT_SUFFIX}");
            prompt_tokens.push(tokenizer.token_count(&prompt) as u32);
            prompts.push(prompt);
            summaries.push(summary.to_string());
        }
    }

    materialized.with_column(Series::new("prompt".into(), prompts))?;
    materialized.with_column(Series::new("summary".into(), summaries))?;
    materialized.with_column(Series::new("prompt_tokens".into(), prompt_tokens))?;

    Ok(materialized.lazy())
}

fn apply_token_budget(frame: LazyFrame, max_input_tokens: Option<usize>) -> LazyFrame {
    match max_input_tokens {
        Some(budget) => frame.filter(col("prompt_tokens").lt_eq(lit(budget as u32))),
        None => frame,
    }
}
