//! Preprocessing stage for NET-EST: turns raw text into a `Document` of
//! paragraphs and sentences with stable character offsets.

mod error;
mod normalize;
mod pipeline;
mod segment;

pub use error::{Result, TextError};
pub use pipeline::{PreprocessStep, Preprocessor, PreprocessorConfig};
pub use segment::build_document;
