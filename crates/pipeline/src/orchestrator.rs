//! Sequential Preprocessor -> Embedder -> Aligner -> Features -> Classifier
//! run, producing a `steps: Vec<StageTrace>` trail and seeding the result
//! into the Annotation Store.

use crate::error::PipelineError;
use crate::trace::StageTrace;
use net_est_align::{Aligner, AlignerConfig};
use net_est_classify::Classifier;
use net_est_config::{ClassifierConfig, Settings};
use net_est_core::{AlignmentResult, Document, StrategyPrediction};
use net_est_embedding::EmbeddingService;
use net_est_features::{extract_features, propose_spans};
use net_est_store::AnnotationStore;
use net_est_text::{Preprocessor, PreprocessorConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub session_id: String,
    pub alignment: AlignmentResult,
    pub predictions: Vec<StrategyPrediction>,
    pub steps: Vec<StageTrace>,
    pub degraded: bool,
}

pub struct Orchestrator {
    preprocessor: Preprocessor,
    embedding: Arc<EmbeddingService>,
    aligner: Aligner,
    classifier_config: ClassifierConfig,
    store: Arc<dyn AnnotationStore>,
    semaphore: Arc<Semaphore>,
    stage_timeout: Duration,
}

impl Orchestrator {
    pub fn new(settings: &Settings, embedding: Arc<EmbeddingService>, store: Arc<dyn AnnotationStore>) -> Self {
        Self {
            preprocessor: Preprocessor::new(PreprocessorConfig { max_words: settings.max_words }),
            embedding,
            aligner: Aligner::new(AlignerConfig {
                threshold: settings.aligner.threshold,
                top_k: settings.aligner.top_k,
            }),
            classifier_config: settings.classifier.clone(),
            store,
            semaphore: Arc::new(Semaphore::new(settings.worker_pool_size)),
            stage_timeout: Duration::from_millis(settings.stage_timeout_ms),
        }
    }

    /// Runs the full pipeline for one session and persists the result.
    pub async fn run(&self, session_id: &str, source_raw: &str, target_raw: &str) -> Result<PipelineOutcome, PipelineError> {
        let _permit = self.semaphore.clone().acquire_owned().await.map_err(|_| PipelineError::WorkerPoolClosed)?;

        let mut steps = Vec::new();

        let (source_doc, trace) = self.preprocess(source_raw, "preprocess_source").await?;
        steps.push(trace);
        let (target_doc, trace) = self.preprocess(target_raw, "preprocess_target").await?;
        steps.push(trace);

        let degraded = self.embedding.is_degraded();

        let (mut alignment, trace) = self.align(&source_doc, &target_doc, degraded).await?;
        steps.push(trace);

        let (predictions, trace) = self.classify_pairs(&source_doc, &target_doc, &alignment, degraded);
        alignment.truncated = trace.truncated;
        steps.push(trace);

        self.store.seed(session_id, &source_doc.raw_text, &target_doc.raw_text, predictions.clone()).await?;

        Ok(PipelineOutcome {
            session_id: session_id.to_string(),
            alignment,
            predictions,
            steps,
            degraded,
        })
    }

    async fn preprocess(&self, raw: &str, name: &str) -> Result<(Document, StageTrace), PipelineError> {
        let start = Instant::now();
        let preprocessor = self.preprocessor.clone();
        let raw = raw.to_string();

        let handle = tokio::task::spawn_blocking(move || preprocessor.process(&raw));
        let joined = tokio::time::timeout(self.stage_timeout, handle)
            .await
            .map_err(|_| PipelineError::StageTimeout(name.to_string()))?;
        let (document, preprocess_steps) = joined.map_err(|_| PipelineError::StageTimeout(name.to_string()))??;

        let detail = preprocess_steps.into_iter().map(|s| s.detail).collect::<Vec<_>>().join("; ");
        Ok((
            document,
            StageTrace {
                name: name.to_string(),
                detail,
                duration_ms: start.elapsed().as_millis() as u64,
                truncated: false,
            },
        ))
    }

    async fn align(&self, source_doc: &Document, target_doc: &Document, degraded: bool) -> Result<(AlignmentResult, StageTrace), PipelineError> {
        let start = Instant::now();
        let source_texts: Vec<String> = source_doc.paragraphs.iter().map(|p| p.text.clone()).collect();
        let target_texts: Vec<String> = target_doc.paragraphs.iter().map(|p| p.text.clone()).collect();

        let alignment = if degraded {
            self.aligner.align_lexical(&source_texts, &target_texts)
        } else {
            let combined: Vec<String> = source_texts.iter().cloned().chain(target_texts.iter().cloned()).collect();
            let embeddings = tokio::time::timeout(self.stage_timeout, self.embedding.clone().encode_async(combined))
                .await
                .map_err(|_| PipelineError::StageTimeout("embed".to_string()))??;

            let (source_embeddings, target_embeddings) = embeddings.split_at(source_texts.len());
            self.aligner.align(source_embeddings, target_embeddings)
        };

        let detail = format!(
            "{} pairs, {} unaligned source, {} unaligned target{}",
            alignment.pairs.len(),
            alignment.unaligned_source.len(),
            alignment.unaligned_target.len(),
            if degraded { " (lexical fallback)" } else { "" }
        );
        Ok((
            alignment,
            StageTrace {
                name: "align".to_string(),
                detail,
                duration_ms: start.elapsed().as_millis() as u64,
                truncated: false,
            },
        ))
    }

    /// Classifies every aligned pair, bailing out early (and marking the
    /// trace truncated) if `stage_timeout_ms` elapses mid-document instead
    /// of cancelling the whole run.
    fn classify_pairs(&self, source_doc: &Document, target_doc: &Document, alignment: &AlignmentResult, degraded: bool) -> (Vec<StrategyPrediction>, StageTrace) {
        let start = Instant::now();
        let deadline = start + self.stage_timeout;
        let classifier = Classifier::new(&self.classifier_config);

        let mut predictions = Vec::new();
        let mut truncated = false;
        for pair in &alignment.pairs {
            if Instant::now() >= deadline {
                truncated = true;
                break;
            }
            let source_paragraph = &source_doc.paragraphs[pair.source_paragraph_index];
            let target_paragraph = &target_doc.paragraphs[pair.target_paragraph_index];
            let features = extract_features(source_paragraph, target_paragraph, pair.similarity, degraded);
            let proposals = propose_spans(source_paragraph, target_paragraph, &features);
            predictions.extend(classifier.classify(source_paragraph, target_paragraph, &features, &proposals));
        }

        let detail = format!(
            "{} predictions over {} pairs{}",
            predictions.len(),
            alignment.pairs.len(),
            if truncated { " (truncated)" } else { "" }
        );
        (
            predictions,
            StageTrace {
                name: "classify".to_string(),
                detail,
                duration_ms: start.elapsed().as_millis() as u64,
                truncated,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_est_store::FilesystemStore;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.aligner.threshold = 0.1;
        settings
    }

    #[tokio::test]
    async fn runs_end_to_end_in_degraded_mode() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnnotationStore> = Arc::new(FilesystemStore::new(dir.path()).unwrap());
        let embedding = Arc::new(EmbeddingService::degraded(16));
        let orchestrator = Orchestrator::new(&settings(), embedding, store.clone());

        let outcome = orchestrator
            .run(
                "s1",
                "A administracao publica estabeleceu criterios rigorosos para a concessao de beneficios.",
                "O governo fez regras rigidas para dar beneficios.",
            )
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.steps.len(), 4);
        assert!(!outcome.alignment.pairs.is_empty());

        let visible = store.list_visible("s1").await.unwrap();
        assert_eq!(visible.len(), outcome.predictions.len());
    }

    #[tokio::test]
    async fn empty_input_surfaces_as_pipeline_error() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnnotationStore> = Arc::new(FilesystemStore::new(dir.path()).unwrap());
        let embedding = Arc::new(EmbeddingService::degraded(16));
        let orchestrator = Orchestrator::new(&settings(), embedding, store);

        let result = orchestrator.run("s2", "   ", "alvo").await;
        assert!(matches!(result, Err(PipelineError::Text(_))));
    }
}
