pub mod batch;
pub use batch::{BatchError, BatchMerger, BatchOptions, BatchSummary};

pub mod extractor;
pub use extractor::{ExtractError, extract_file, extract_record};

pub mod minify;
pub use minify::remove_empty_keys;

pub mod prior;
pub use prior::PriorIndex;
