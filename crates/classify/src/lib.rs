//! Strategy Classifier: turns a feature vector and span proposals into
//! `StrategyPrediction`s over the fourteen-tag vocabulary (spec §4.5).

mod rules;

pub use rules::{Rule, OM_RULE, RULES};

use net_est_config::ClassifierConfig;
use net_est_core::{Paragraph, Span, StrategyCode, StrategyPrediction};
use net_est_features::{PairFeatures, SpanKind, SpanProposal};

pub struct Classifier<'a> {
    config: &'a ClassifierConfig,
}

const DEGRADED_EVIDENCE: &str = "degraded_mode";

impl<'a> Classifier<'a> {
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self { config }
    }

    /// Runs every applicable rule against the pair and returns predictions
    /// above `classifier.min_confidence`. `source`/`target` are the aligned
    /// paragraphs, used only by the heading heuristic (`MT+`) which needs
    /// text structure beyond the numeric feature vector.
    pub fn classify(
        &self,
        source: &Paragraph,
        target: &Paragraph,
        features: &PairFeatures,
        proposals: &[SpanProposal],
    ) -> Vec<StrategyPrediction> {
        let mut predictions = Vec::new();

        for rule in RULES {
            self.try_rule(rule, features, proposals, &mut predictions);
        }

        if self.config.enable_om {
            self.try_rule(&OM_RULE, features, proposals, &mut predictions);
        }

        if let Some(prediction) = self.try_heading_rule(source, target, proposals, features) {
            predictions.push(prediction);
        }

        predictions.retain(|p| p.confidence >= self.config.min_confidence);
        tracing::debug!(count = predictions.len(), paragraph = target.index, "classified pair");
        predictions
    }

    fn try_rule(&self, rule: &Rule, features: &PairFeatures, proposals: &[SpanProposal], out: &mut Vec<StrategyPrediction>) {
        let weight = self.config.weight_for(rule.tag);
        let threshold = weight.threshold_override.unwrap_or(rule.base_threshold);
        let multiplier = weight.weight_multiplier.unwrap_or(1.0);

        if !(rule.predicate)(features, threshold) {
            return;
        }

        let confidence = (rule.confidence_fn)(features, multiplier).clamp(0.0, 1.0);
        let mut evidence = (rule.evidence_fn)(features);
        if features.degraded {
            evidence.push(DEGRADED_EVIDENCE.to_string());
        }

        let (target_offsets, source_offsets) = pick_span(rule.tag, proposals);

        out.push(StrategyPrediction::new_machine(rule.tag, confidence, evidence, target_offsets, source_offsets));
    }

    fn try_heading_rule(
        &self,
        source: &Paragraph,
        target: &Paragraph,
        proposals: &[SpanProposal],
        features: &PairFeatures,
    ) -> Option<StrategyPrediction> {
        if !target.looks_like_heading() || target.text == source.text {
            return None;
        }

        let weight = self.config.weight_for(StrategyCode::MT);
        let confidence = (0.6 * weight.weight_multiplier.unwrap_or(1.0)).clamp(0.0, 1.0);
        let mut evidence = vec!["target paragraph reads as a retitled heading".to_string()];
        if features.degraded {
            evidence.push(DEGRADED_EVIDENCE.to_string());
        }

        let (target_offsets, source_offsets) = pick_span(StrategyCode::MT, proposals);
        Some(StrategyPrediction::new_machine(StrategyCode::MT, confidence, evidence, target_offsets, source_offsets))
    }
}

/// Chooses the span proposal that best matches a tag's semantics, falling
/// back to the whole-paragraph anchor that is always present.
fn pick_span(tag: StrategyCode, proposals: &[SpanProposal]) -> (Vec<Span>, Option<Vec<Span>>) {
    let preferred_kind = match tag {
        StrategyCode::EXP | StrategyCode::IN => SpanKind::InsertedSpan,
        StrategyCode::OM => SpanKind::DeletedSpan,
        StrategyCode::RP | StrategyCode::RD => SpanKind::SentenceAnchor,
        _ => SpanKind::Paragraph,
    };

    let chosen = proposals
        .iter()
        .find(|p| p.kind == preferred_kind)
        .or_else(|| proposals.iter().find(|p| p.kind == SpanKind::Paragraph))
        .expect("paragraph span proposal is always present");

    (chosen.target_offsets.clone(), chosen.source_offsets.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_est_core::Sentence;

    fn paragraph(text: &str) -> Paragraph {
        Paragraph {
            index: 0,
            text: text.to_string(),
            sentences: vec![Sentence {
                index_in_paragraph: 0,
                global_index: 0,
                text: text.to_string(),
                char_start: 0,
                char_end: text.chars().count(),
            }],
            char_start: 0,
            char_end: text.chars().count(),
        }
    }

    fn base_features(similarity: f64, overlap: f64) -> PairFeatures {
        PairFeatures {
            length_ratio: 1.0,
            sentence_count_ratio: 1.0,
            avg_source_sentence_words: 10.0,
            avg_target_sentence_words: 10.0,
            avg_source_word_chars: 6.0,
            avg_target_word_chars: 6.0,
            lexical_overlap: overlap,
            semantic_similarity: similarity,
            connectors_gained: vec![],
            connectors_lost: vec![],
            target_sentence_count: 1,
            source_sentence_count: 1,
            passive_suffix_rate_source: 0.0,
            passive_suffix_rate_target: 0.0,
            pronoun_rate_source: 0.0,
            pronoun_rate_target: 0.0,
            capitalized_rate_target: 0.0,
            degraded: false,
        }
    }

    fn default_proposals(source: &Paragraph, target: &Paragraph) -> Vec<SpanProposal> {
        vec![SpanProposal {
            kind: SpanKind::Paragraph,
            target_offsets: vec![Span { start: target.char_start, end: target.char_end }],
            source_offsets: Some(vec![Span { start: source.char_start, end: source.char_end }]),
        }]
    }

    #[test]
    fn om_plus_never_fires_when_disabled() {
        let config = ClassifierConfig { enable_om: false, ..Default::default() };
        let classifier = Classifier::new(&config);
        let source = paragraph("um texto razoavelmente longo para ser reduzido");
        let target = paragraph("um texto reduzido");
        let mut features = base_features(0.8, 0.5);
        features.length_ratio = 0.5;
        let proposals = default_proposals(&source, &target);
        let predictions = classifier.classify(&source, &target, &features, &proposals);
        assert!(!predictions.iter().any(|p| p.code == StrategyCode::OM));
    }

    #[test]
    fn pro_plus_is_never_emitted() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let source = paragraph("a");
        let target = paragraph("b");
        let features = base_features(0.1, 0.1);
        let proposals = default_proposals(&source, &target);
        let predictions = classifier.classify(&source, &target, &features, &proposals);
        assert!(!predictions.iter().any(|p| p.code == StrategyCode::PRO));
    }

    #[test]
    fn low_confidence_predictions_are_dropped() {
        let config = ClassifierConfig { min_confidence: 0.99, ..Default::default() };
        let classifier = Classifier::new(&config);
        let source = paragraph("a lei representa um marco fundamental na gestao publica brasileira");
        let target = paragraph("a lei e muito importante para o brasil");
        let features = base_features(0.8, 0.5);
        let proposals = default_proposals(&source, &target);
        let predictions = classifier.classify(&source, &target, &features, &proposals);
        assert!(predictions.is_empty());
    }

    #[test]
    fn sl_rule_fires_on_shorter_target_words() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::new(&config);
        let source = paragraph("a administracao publica estabeleceu criterios rigorosos");
        let target = paragraph("o governo fez regras");
        let mut features = base_features(0.8, 0.5);
        features.avg_source_word_chars = 9.0;
        features.avg_target_word_chars = 5.0;
        let proposals = default_proposals(&source, &target);
        let predictions = classifier.classify(&source, &target, &features, &proposals);
        assert!(predictions.iter().any(|p| p.code == StrategyCode::SL));
    }
}
