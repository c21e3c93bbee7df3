//! Orchestrates the Preprocessor, Embedder, Paragraph Aligner, Feature/Span
//! Extractor, and Strategy Classifier into a single run per session, then
//! seeds the result into an `AnnotationStore`.

mod error;
mod orchestrator;
mod trace;

pub use error::PipelineError;
pub use orchestrator::{Orchestrator, PipelineOutcome};
pub use trace::StageTrace;
