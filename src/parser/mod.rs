//! Low-level parsing: XML trees, AniDB partial dates and document file names.

pub mod date;
pub mod document;
pub mod filename;

pub use date::{InvalidDate, PartialDate};
pub use document::{DocumentError, Element};
pub use filename::{is_document_candidate, parse_document_filename};
