//! Industry-mode fan-out: search the ad library for a set of seed business
//! terms and aggregate each result into one `IndustryIntelligence` record.
//!
//! Individual searches that fail are logged and skipped; the fan-out only
//! produces an empty record when every search fails or returns nothing.

use funnelscope_adlib::AdLibraryClient;

use crate::ads::aggregate_ads;
use crate::{dedupe_cap, IndustryIntelligence, SpendDistribution, SpendLevel};

const MAX_COMMON_HOOKS: usize = 10;

/// Seed search terms per industry slug. Unknown industries fall back to
/// searching the industry string itself.
pub const INDUSTRY_SEEDS: &[(&str, &[&str])] = &[
    (
        "body-contouring",
        &[
            "body contouring clinic",
            "fat freezing clinic",
            "body sculpting studio",
            "skin tightening clinic",
        ],
    ),
    (
        "aesthetics",
        &["aesthetic clinic", "skin clinic", "laser clinic"],
    ),
    (
        "dental",
        &["cosmetic dentist", "dental implants clinic", "teeth straightening"],
    ),
    (
        "fitness",
        &["personal training studio", "fitness bootcamp", "body transformation gym"],
    ),
];

#[must_use]
pub fn seeds_for(industry: &str) -> Vec<String> {
    for (slug, seeds) in INDUSTRY_SEEDS {
        if industry.eq_ignore_ascii_case(slug) {
            return seeds.iter().map(ToString::to_string).collect();
        }
    }
    vec![industry.to_string()]
}

/// Fan out over the industry's seed terms, aggregate each corpus, and roll
/// up common hooks and the spend distribution.
pub async fn search_industry(
    client: &AdLibraryClient,
    industry: &str,
    per_term_limit: u32,
) -> IndustryIntelligence {
    let mut competitors = Vec::new();

    for term in seeds_for(industry) {
        match client.search_by_name(&term, per_term_limit).await {
            Ok(ads) if ads.is_empty() => {
                tracing::debug!(industry, term, "no ads found for seed term");
            }
            Ok(ads) => {
                tracing::debug!(industry, term, count = ads.len(), "collected ad corpus");
                competitors.push(aggregate_ads(&term, &ads));
            }
            Err(e) => {
                tracing::warn!(industry, term, error = %e, "seed search failed");
            }
        }
    }

    let mut spend_distribution = SpendDistribution::default();
    for competitor in &competitors {
        match competitor.estimated_spend.level {
            SpendLevel::Low => spend_distribution.low += 1,
            SpendLevel::Medium => spend_distribution.medium += 1,
            SpendLevel::High => spend_distribution.high += 1,
        }
    }

    let common_hooks = dedupe_cap(
        competitors
            .iter()
            .flat_map(|c| c.funnel.awareness.clone())
            .collect(),
        MAX_COMMON_HOOKS,
    );

    IndustryIntelligence {
        industry: industry.to_string(),
        competitors,
        common_hooks,
        spend_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_industry_returns_its_seed_terms() {
        let seeds = seeds_for("body-contouring");
        assert_eq!(seeds.len(), 4);
        assert!(seeds.contains(&"fat freezing clinic".to_string()));
    }

    #[test]
    fn industry_lookup_is_case_insensitive() {
        assert_eq!(seeds_for("Body-Contouring").len(), 4);
    }

    #[test]
    fn unknown_industry_falls_back_to_itself() {
        assert_eq!(seeds_for("falconry"), vec!["falconry".to_string()]);
    }
}
