use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dataset '{dataset}' is not (yet) implemented (registered: {registered:?})")]
    UnsupportedDataset {
        dataset: String,
        registered: Vec<&'static str>,
    },
}
