pub mod extractor;
pub mod file_store;
pub mod metadata_store;

pub use extractor::{Extraction, ExtractionOutcome, TextExtractor};
pub use file_store::FileStore;
pub use metadata_store::MetadataStore;
