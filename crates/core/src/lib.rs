pub mod error;
pub mod model;
pub mod preproc;
pub mod registry;
pub mod tokenizer;

pub use error::DispatchError;
pub use model::dataset_config::DatasetConfig;
pub use preproc::scientific_papers::{ScientificPapers, ScientificPapersError};
pub use registry::{get_preprocessed_dataset, registered_datasets, Preprocess, DEFAULT_SPLIT};
pub use tokenizer::Tokenizer;
