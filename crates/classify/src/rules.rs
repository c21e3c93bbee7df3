//! The strategy rule table: a list of `{tag, predicate, confidence_fn, evidence_fn}`
//! records the classifier iterates, per spec §4.5/§9 ("rule engine as data").

use net_est_core::StrategyCode;
use net_est_features::PairFeatures;

pub struct Rule {
    pub tag: StrategyCode,
    /// Default gating threshold for this rule's primary signal; overridable
    /// per-tag via `classifier.rule_weights.<TAG>.threshold_override`.
    pub base_threshold: f64,
    pub predicate: fn(&PairFeatures, f64) -> bool,
    pub confidence_fn: fn(&PairFeatures, f64) -> f64,
    pub evidence_fn: fn(&PairFeatures) -> Vec<String>,
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

pub static RULES: &[Rule] = &[
    Rule {
        tag: StrategyCode::SL,
        base_threshold: 0.75,
        predicate: |f, threshold| {
            f.lexical_overlap > 0.3
                && f.lexical_overlap < 0.85
                && f.avg_target_word_chars < f.avg_source_word_chars
                && f.semantic_similarity >= threshold
        },
        confidence_fn: |f, weight| {
            let delta = (f.avg_source_word_chars - f.avg_target_word_chars).max(0.0);
            clamp01(0.5 + delta / 5.0) * weight
        },
        evidence_fn: |f| {
            vec![format!(
                "average word length dropped from {:.1} to {:.1} characters",
                f.avg_source_word_chars, f.avg_target_word_chars
            )]
        },
    },
    Rule {
        tag: StrategyCode::RP,
        base_threshold: 0.7,
        predicate: |f, threshold| f.sentence_count_ratio > 1.0 && f.semantic_similarity >= threshold,
        confidence_fn: |f, weight| clamp01(0.4 + (f.sentence_count_ratio - 1.0) * 0.3) * weight,
        evidence_fn: |f| {
            vec![format!(
                "sentence count ratio {:.2} (target has more, shorter sentences)",
                f.sentence_count_ratio
            )]
        },
    },
    Rule {
        tag: StrategyCode::RF,
        base_threshold: 0.65,
        predicate: |f, threshold| f.length_ratio <= 0.6 && f.lexical_overlap < 0.4 && f.semantic_similarity >= threshold,
        confidence_fn: |f, weight| clamp01(0.5 + (0.6 - f.length_ratio) * 0.8) * weight,
        evidence_fn: |f| vec![format!("length ratio {:.2} suggests a global rewrite", f.length_ratio)],
    },
    Rule {
        tag: StrategyCode::EXP,
        base_threshold: 0.75,
        predicate: |f, threshold| f.length_ratio >= 1.15 && !f.connectors_gained.is_empty() && f.semantic_similarity >= threshold,
        confidence_fn: |f, weight| clamp01(0.4 + f.connectors_gained.len() as f64 * 0.15) * weight,
        evidence_fn: |f| vec![format!("{} new connector(s) detected: {:?}", f.connectors_gained.len(), f.connectors_gained)],
    },
    Rule {
        tag: StrategyCode::MV,
        base_threshold: 0.1,
        predicate: |f, delta| (f.passive_suffix_rate_source - f.passive_suffix_rate_target).abs() >= delta,
        confidence_fn: |f, weight| {
            let delta = (f.passive_suffix_rate_source - f.passive_suffix_rate_target).abs();
            clamp01(0.4 + delta * 2.0) * weight
        },
        evidence_fn: |f| {
            vec![format!(
                "passive-participle rate changed from {:.2} to {:.2}",
                f.passive_suffix_rate_source, f.passive_suffix_rate_target
            )]
        },
    },
    Rule {
        tag: StrategyCode::TA,
        base_threshold: 0.05,
        predicate: |f, delta| {
            let pronoun_drop = f.pronoun_rate_source - f.pronoun_rate_target;
            pronoun_drop >= delta && f.capitalized_rate_target > 0.0
        },
        confidence_fn: |f, weight| {
            let pronoun_drop = (f.pronoun_rate_source - f.pronoun_rate_target).max(0.0);
            clamp01(0.4 + pronoun_drop * 2.0) * weight
        },
        evidence_fn: |f| {
            vec![format!(
                "pronoun rate dropped from {:.2} to {:.2}, capitalized-word rate {:.2} in target",
                f.pronoun_rate_source, f.pronoun_rate_target, f.capitalized_rate_target
            )]
        },
    },
    Rule {
        tag: StrategyCode::MOD,
        base_threshold: 0.0,
        predicate: |f, _| (0.55..0.8).contains(&f.semantic_similarity) && f.lexical_overlap < 0.5 && (f.length_ratio - 1.0).abs() < 0.2,
        confidence_fn: |f, weight| clamp01(0.6 - f.lexical_overlap * 0.4) * weight,
        evidence_fn: |f| vec![format!("moderate similarity {:.2} with low lexical overlap {:.2}", f.semantic_similarity, f.lexical_overlap)],
    },
    Rule {
        tag: StrategyCode::AS,
        base_threshold: 0.55,
        predicate: |f, threshold| f.semantic_similarity < threshold && f.lexical_overlap < 0.3,
        confidence_fn: |f, weight| clamp01(0.7 - f.semantic_similarity) * weight,
        evidence_fn: |f| vec![format!("low semantic similarity {:.2} suggests sense alteration", f.semantic_similarity)],
    },
    Rule {
        tag: StrategyCode::DL,
        base_threshold: 0.75,
        predicate: |f, threshold| f.semantic_similarity >= threshold && f.lexical_overlap >= 0.7,
        confidence_fn: |f, weight| clamp01(0.5 + f.lexical_overlap * 0.3) * weight,
        evidence_fn: |_| vec!["high similarity and overlap with likely reordering".to_string()],
    },
    Rule {
        tag: StrategyCode::RD,
        base_threshold: 1.5,
        predicate: |f, threshold| f.sentence_count_ratio >= threshold && f.source_sentence_count == 1,
        confidence_fn: |f, weight| clamp01(0.4 + (f.sentence_count_ratio - 1.0) * 0.2) * weight,
        evidence_fn: |f| vec![format!("one source sentence restructured into {} target sentences", f.target_sentence_count)],
    },
    Rule {
        tag: StrategyCode::IN,
        base_threshold: 0.0,
        predicate: |f, _| !f.connectors_gained.is_empty() || !f.connectors_lost.is_empty(),
        confidence_fn: |_, weight| 0.55 * weight,
        evidence_fn: |f| vec![format!("insertion signal: gained {:?}, lost {:?}", f.connectors_gained, f.connectors_lost)],
    },
];

/// `OM+` is excluded from `RULES` because it must only run when explicitly
/// enabled; it lives in its own record checked separately by the classifier.
pub static OM_RULE: Rule = Rule {
    tag: StrategyCode::OM,
    base_threshold: 0.7,
    predicate: |f, threshold| f.length_ratio <= 0.75 && f.lexical_overlap > 0.3 && f.lexical_overlap < 0.7 && f.semantic_similarity >= threshold,
    confidence_fn: |f, weight| clamp01(0.4 + (0.75 - f.length_ratio) * 0.6) * weight,
    evidence_fn: |f| vec![format!("length ratio {:.2} suggests selective suppression", f.length_ratio)],
};
