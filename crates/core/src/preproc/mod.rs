pub mod scientific_papers;

pub use scientific_papers::{ScientificPapers, ScientificPapersError};
