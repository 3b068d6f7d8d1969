//! Qualification scoring: pure additive folding of a weights table.
//!
//! Deterministic and side-effect-free by contract — identical answers
//! always produce identical scores, and no rule combination can push a
//! score outside the caps declared in the ruleset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use funnelscope_core::WeightedRules;

/// A lead's questionnaire answers: question id to selected option value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationAnswers {
    pub answers: BTreeMap<String, String>,
}

impl QualificationAnswers {
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            answers: pairs
                .iter()
                .map(|(q, o)| ((*q).to_string(), (*o).to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub match_score: u8,
    pub urgency_score: u8,
    pub conversion_probability: f64,
    pub recommended_treatment: String,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("missing required qualification answer: {question}")]
    MissingAnswer { question: String },
}

/// Score a lead's answers against the weights table.
///
/// Scores start from the ruleset's bases, accumulate the deltas of every
/// matching (question, option) rule, and are clamped to the declared caps.
/// The recommended treatment is the highest accumulated weight; ties break
/// toward the earlier declaration.
///
/// # Errors
///
/// Returns [`ScoringError::MissingAnswer`] when a question listed in the
/// ruleset's `required` set has no answer. Unknown questions and options
/// are ignored, never defaulted.
pub fn score(
    answers: &QualificationAnswers,
    rules: &WeightedRules,
) -> Result<ScoreResult, ScoringError> {
    for question in &rules.required {
        if !answers.answers.contains_key(question) {
            return Err(ScoringError::MissingAnswer {
                question: question.clone(),
            });
        }
    }

    let mut match_score = rules.base.match_score;
    let mut urgency_score = rules.base.urgency_score;
    let mut conversion = rules.base.conversion_probability;

    let mut treatment_weights: Vec<(usize, f64)> = rules
        .treatments
        .iter()
        .enumerate()
        .map(|(i, t)| (i, t.base_weight))
        .collect();

    for rule in &rules.rules {
        let selected = answers.answers.get(&rule.question);
        if selected.is_none_or(|option| option != &rule.option) {
            continue;
        }

        match_score += rule.match_delta;
        urgency_score += rule.urgency_delta;
        conversion += rule.conversion_delta;

        for (index, treatment) in rules.treatments.iter().enumerate() {
            if let Some(extra) = rule.treatment_weights.get(&treatment.name) {
                treatment_weights[index].1 += extra;
            }
        }
    }

    let recommended = treatment_weights
        .iter()
        .fold((0usize, f64::MIN), |(best_i, best_w), &(i, w)| {
            // Strictly-greater keeps the first-declared treatment on ties.
            if w > best_w {
                (i, w)
            } else {
                (best_i, best_w)
            }
        });

    Ok(ScoreResult {
        match_score: clamp_score(match_score, rules.caps.match_score),
        urgency_score: clamp_score(urgency_score, rules.caps.urgency_score),
        conversion_probability: conversion.clamp(0.0, rules.caps.conversion_probability),
        recommended_treatment: rules.treatments[recommended.0].name.clone(),
    })
}

fn clamp_score(value: i32, cap: u8) -> u8 {
    u8::try_from(value.clamp(0, i32::from(cap))).unwrap_or(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rules() -> WeightedRules {
        WeightedRules::embedded_default()
    }

    fn full_answers() -> QualificationAnswers {
        QualificationAnswers::from_pairs(&[
            ("method", "ozempic"),
            ("commitment", "ready"),
            ("skin_feel", "loose"),
            ("timeline", "asap"),
        ])
    }

    #[test]
    fn identical_answers_produce_identical_scores() {
        let rules = default_rules();
        let answers = full_answers();
        let first = score(&answers, &rules).unwrap();
        let second = score(&answers, &rules).unwrap();
        assert_eq!(first.match_score, second.match_score);
        assert_eq!(first.urgency_score, second.urgency_score);
        assert!(first.conversion_probability == second.conversion_probability);
        assert_eq!(first.recommended_treatment, second.recommended_treatment);
    }

    #[test]
    fn stacked_positive_answers_hit_the_conversion_cap_exactly() {
        // 0.30 base + 0.25 + 0.20 + 0.15 + 0.10 overshoots the 0.95 cap.
        let result = score(&full_answers(), &default_rules()).unwrap();
        assert!(result.conversion_probability == 0.95);
    }

    #[test]
    fn stacked_positive_answers_respect_all_caps() {
        let rules = default_rules();
        let result = score(&full_answers(), &rules).unwrap();
        assert!(result.match_score <= rules.caps.match_score);
        assert!(result.urgency_score <= rules.caps.urgency_score);
        assert!(result.conversion_probability <= rules.caps.conversion_probability);
        assert!(result.conversion_probability >= 0.0);
        assert_eq!(result.match_score, 95, "50 base + 60 in deltas clamps to 95");
    }

    #[test]
    fn weight_loss_by_injection_recommends_skin_tightening() {
        let result = score(&full_answers(), &default_rules()).unwrap();
        assert_eq!(
            result.recommended_treatment,
            "Skin Tightening (RF Microneedling)"
        );
    }

    #[test]
    fn diet_and_firm_skin_recommends_fat_freezing() {
        let answers = QualificationAnswers::from_pairs(&[
            ("method", "diet_exercise"),
            ("commitment", "researching"),
            ("skin_feel", "firm"),
            ("timeline", "three_months"),
        ]);
        let result = score(&answers, &default_rules()).unwrap();
        assert_eq!(
            result.recommended_treatment,
            "Fat Freezing (Cryolipolysis)"
        );
    }

    #[test]
    fn ties_break_toward_declaration_order() {
        // No treatment-weight rules fire: the first two treatments tie on
        // base_weight 1.0 and the first declared wins.
        let answers = QualificationAnswers::from_pairs(&[
            ("method", "surgery"),
            ("commitment", "ready"),
            ("skin_feel", "unknown_option"),
            ("timeline", "asap"),
        ]);
        let rules = default_rules();
        let result = score(&answers, &rules).unwrap();
        assert_eq!(result.recommended_treatment, rules.treatments[0].name);
    }

    #[test]
    fn missing_required_answer_is_an_error() {
        let answers = QualificationAnswers::from_pairs(&[("method", "ozempic")]);
        let err = score(&answers, &default_rules()).unwrap_err();
        assert!(matches!(err, ScoringError::MissingAnswer { ref question } if question == "commitment"));
    }

    #[test]
    fn unknown_options_contribute_nothing() {
        let neutral = QualificationAnswers::from_pairs(&[
            ("method", "unheard_of"),
            ("commitment", "unheard_of"),
            ("skin_feel", "unheard_of"),
            ("timeline", "unheard_of"),
        ]);
        let rules = default_rules();
        let result = score(&neutral, &rules).unwrap();
        assert_eq!(i32::from(result.match_score), rules.base.match_score);
        assert_eq!(i32::from(result.urgency_score), rules.base.urgency_score);
        assert!(result.conversion_probability == rules.base.conversion_probability);
    }

    #[test]
    fn negative_deltas_never_push_scores_below_zero() {
        let mut rules = default_rules();
        rules.required.clear();
        for rule in &mut rules.rules {
            rule.match_delta = -200;
        }
        let answers = QualificationAnswers::from_pairs(&[("method", "ozempic")]);
        let result = score(&answers, &rules).unwrap();
        assert_eq!(result.match_score, 0);
    }
}
