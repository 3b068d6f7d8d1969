//! Qualification scoring ruleset.
//!
//! The weights in this table are business tuning carried as configuration
//! data. The scorer folds the table; nothing in the pipeline hard-codes a
//! delta. See `config/scoring.yaml` for the shipped default.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Shipped default ruleset, compiled in so the service can start without a
/// config directory present.
const DEFAULT_RULES_YAML: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/scoring.yaml"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBases {
    pub match_score: i32,
    pub urgency_score: i32,
    pub conversion_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCaps {
    pub match_score: u8,
    pub urgency_score: u8,
    pub conversion_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    pub name: String,
    pub base_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRule {
    pub question: String,
    pub option: String,
    #[serde(default)]
    pub match_delta: i32,
    #[serde(default)]
    pub urgency_delta: i32,
    #[serde(default)]
    pub conversion_delta: f64,
    #[serde(default)]
    pub treatment_weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedRules {
    pub base: ScoreBases,
    pub caps: ScoreCaps,
    /// Question ids a caller must answer; anything else is optional.
    #[serde(default)]
    pub required: Vec<String>,
    /// Declaration order is meaningful: it breaks treatment-ranking ties.
    pub treatments: Vec<Treatment>,
    pub rules: Vec<AnswerRule>,
}

impl WeightedRules {
    /// Load and validate a ruleset from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let rules: WeightedRules = serde_yaml::from_str(&content)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load from `path` when the file exists, otherwise fall back to the
    /// embedded default with a warning left to the caller's logging.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present file is malformed — a broken
    /// operator override is never silently replaced by the default.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::embedded_default())
        }
    }

    /// The compiled-in default ruleset.
    ///
    /// # Panics
    ///
    /// Panics only if the embedded YAML is malformed, which is a build
    /// defect, not a runtime condition.
    #[must_use]
    pub fn embedded_default() -> Self {
        let rules: WeightedRules =
            serde_yaml::from_str(DEFAULT_RULES_YAML).expect("embedded ruleset parses");
        rules.validate().expect("embedded ruleset is valid");
        rules
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.treatments.is_empty() {
            return Err(ConfigError::Validation(
                "ruleset must declare at least one treatment".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.caps.conversion_probability)
            || !(0.0..=1.0).contains(&self.base.conversion_probability)
        {
            return Err(ConfigError::Validation(
                "conversion probability base and cap must be within [0, 1]".to_string(),
            ));
        }

        if self.caps.match_score > 100 {
            return Err(ConfigError::Validation(format!(
                "match score cap {} exceeds 100",
                self.caps.match_score
            )));
        }

        let mut seen_treatments = HashSet::new();
        for treatment in &self.treatments {
            if treatment.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "treatment name must be non-empty".to_string(),
                ));
            }
            if !seen_treatments.insert(treatment.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate treatment: '{}'",
                    treatment.name
                )));
            }
        }

        let mut seen_rules = HashSet::new();
        for rule in &self.rules {
            if !seen_rules.insert((rule.question.as_str(), rule.option.as_str())) {
                return Err(ConfigError::Validation(format!(
                    "duplicate rule for question '{}' option '{}'",
                    rule.question, rule.option
                )));
            }
            for name in rule.treatment_weights.keys() {
                if !seen_treatments.contains(name.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "rule for '{}/{}' references unknown treatment '{name}'",
                        rule.question, rule.option
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml(extra_rules: &str) -> String {
        format!(
            r"
base:
  match_score: 50
  urgency_score: 30
  conversion_probability: 0.3
caps:
  match_score: 95
  urgency_score: 90
  conversion_probability: 0.95
treatments:
  - name: Alpha
    base_weight: 1.0
  - name: Beta
    base_weight: 1.0
rules:
{extra_rules}"
        )
    }

    #[test]
    fn embedded_default_parses_and_validates() {
        let rules = WeightedRules::embedded_default();
        assert!(!rules.treatments.is_empty());
        assert!(!rules.rules.is_empty());
        assert_eq!(rules.caps.match_score, 95);
        assert!((rules.caps.conversion_probability - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_duplicate_rule() {
        let yaml = minimal_yaml(
            r"  - question: q1
    option: a
    match_delta: 5
  - question: q1
    option: a
    match_delta: 10
",
        );
        let rules: WeightedRules = serde_yaml::from_str(&yaml).unwrap();
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate rule"));
    }

    #[test]
    fn validate_rejects_unknown_treatment_reference() {
        let yaml = minimal_yaml(
            r"  - question: q1
    option: a
    treatment_weights:
      Gamma: 1.0
",
        );
        let rules: WeightedRules = serde_yaml::from_str(&yaml).unwrap();
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("unknown treatment"));
    }

    #[test]
    fn validate_rejects_empty_treatments() {
        let yaml = r"
base: {match_score: 50, urgency_score: 30, conversion_probability: 0.3}
caps: {match_score: 95, urgency_score: 90, conversion_probability: 0.95}
treatments: []
rules: []
";
        let rules: WeightedRules = serde_yaml::from_str(yaml).unwrap();
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("at least one treatment"));
    }

    #[test]
    fn validate_rejects_out_of_range_conversion_cap() {
        let yaml = r"
base: {match_score: 50, urgency_score: 30, conversion_probability: 0.3}
caps: {match_score: 95, urgency_score: 90, conversion_probability: 1.4}
treatments:
  - {name: Alpha, base_weight: 1.0}
rules: []
";
        let rules: WeightedRules = serde_yaml::from_str(yaml).unwrap();
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("within [0, 1]"));
    }

    #[test]
    fn load_or_default_falls_back_when_missing() {
        let rules =
            WeightedRules::load_or_default(Path::new("/nonexistent/scoring.yaml")).unwrap();
        assert_eq!(rules.caps.match_score, 95);
    }

    #[test]
    fn rule_deltas_default_to_zero() {
        let yaml = minimal_yaml(
            r"  - question: q1
    option: a
",
        );
        let rules: WeightedRules = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(rules.rules[0].match_delta, 0);
        assert_eq!(rules.rules[0].urgency_delta, 0);
        assert!(rules.rules[0].conversion_delta.abs() < f64::EPSILON);
    }
}
