//! Site-signal aggregation into a `CompetitorIntelligence` record.

use funnelscope_core::{host_of, Currency};
use funnelscope_scraper::ScrapedSignals;

use crate::funnel::reverse_engineer_funnel;
use crate::{
    dedupe_cap, CompetitorIntelligence, CreativePatterns, KnownFacts, PricePositioning,
    SpendEstimate,
};

const MAX_TRAITS: usize = 10;

/// Merge one or more fetches' signals (plus optional statically known
/// facts) into a single intelligence record for the business.
///
/// Signals are consumed by the aggregation and not retained.
#[must_use]
pub fn aggregate(
    signals: &[ScrapedSignals],
    known_facts: Option<&KnownFacts>,
) -> CompetitorIntelligence {
    let business_id = signals
        .first()
        .and_then(|s| host_of(&s.source_url))
        .unwrap_or_else(|| "unknown".to_string());
    let business_type = signals
        .first()
        .map_or_else(
            || funnelscope_scraper::extract::DEFAULT_BUSINESS_TYPE.to_string(),
            |s| s.business_type.clone(),
        );
    let currency = signals.first().map_or(Currency::Usd, |s| s.currency);

    let prices: Vec<String> = signals.iter().flat_map(|s| s.prices.clone()).collect();
    let guarantees: Vec<String> = signals.iter().flat_map(|s| s.guarantees.clone()).collect();
    let headlines: Vec<String> = signals.iter().flat_map(|s| s.headlines.clone()).collect();
    let features: Vec<String> = signals.iter().flat_map(|s| s.features.clone()).collect();
    let ctas: Vec<String> = signals.iter().flat_map(|s| s.cta_labels.clone()).collect();
    let urgency: usize = signals.iter().map(|s| s.urgency_phrases.len()).sum();
    let testimonial_count: usize = signals.iter().map(|s| s.testimonials.len()).sum();

    let derived_positioning = classify_price_positioning(&prices);
    let (mut differentiators, mut weaknesses) = derive_traits(
        &prices,
        &guarantees,
        testimonial_count,
        urgency,
    );

    let mut price_positioning = derived_positioning;
    if let Some(facts) = known_facts {
        // Known facts take precedence: they lead the lists and override the
        // derived positioning when set.
        if let Some(positioning) = facts.price_positioning {
            price_positioning = positioning;
        }
        let mut merged = facts.differentiators.clone();
        merged.extend(differentiators);
        differentiators = merged;
        let mut merged = facts.weaknesses.clone();
        merged.extend(weaknesses);
        weaknesses = merged;
    }

    let funnel = reverse_engineer_funnel(&headlines, &features, &features, &guarantees, &ctas);

    CompetitorIntelligence {
        business_id,
        business_type,
        currency,
        price_positioning,
        differentiators: dedupe_cap(differentiators, MAX_TRAITS),
        weaknesses: dedupe_cap(weaknesses, MAX_TRAITS),
        estimated_spend: SpendEstimate::none_observed(),
        creative_patterns: CreativePatterns::default(),
        funnel,
    }
}

/// Price positioning from raw price tokens.
///
/// Premium wins ties: a safer overestimate for the downstream undercutting
/// strategy. A token is premium evidence when its numeric value reaches
/// four digits or its digits end in the `999`/`000` charm pattern; budget
/// evidence is any value under 500.
#[must_use]
pub fn classify_price_positioning(prices: &[String]) -> PricePositioning {
    let mut premium = false;
    let mut budget = false;

    for token in prices {
        let digits = digits_of(token);
        if let Some(value) = parse_price_value(token) {
            if value >= 1000.0 {
                premium = true;
            } else if value < 500.0 {
                budget = true;
            }
        }
        if digits.len() >= 3 && (digits.ends_with("999") || digits.ends_with("000")) {
            premium = true;
        }
    }

    if premium {
        PricePositioning::Premium
    } else if budget {
        PricePositioning::Budget
    } else {
        PricePositioning::MidMarket
    }
}

/// Numeric value of a raw price token such as `"£1,997"` or `"250 GBP"`.
#[must_use]
pub fn parse_price_value(token: &str) -> Option<f64> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn digits_of(token: &str) -> String {
    token.chars().filter(char::is_ascii_digit).collect()
}

fn derive_traits(
    prices: &[String],
    guarantees: &[String],
    testimonial_count: usize,
    urgency_count: usize,
) -> (Vec<String>, Vec<String>) {
    let mut differentiators = Vec::new();
    let mut weaknesses = Vec::new();

    if guarantees.is_empty() {
        weaknesses.push("No clear guarantee".to_string());
    } else {
        differentiators.push("Guarantee-backed offer".to_string());
    }

    if testimonial_count > 5 {
        differentiators.push("Strong social proof".to_string());
    } else if testimonial_count == 0 {
        weaknesses.push("No visible social proof".to_string());
    }

    if urgency_count > 0 {
        differentiators.push("Active urgency messaging".to_string());
    } else {
        weaknesses.push("No urgency or scarcity messaging".to_string());
    }

    if prices.is_empty() {
        weaknesses.push("Pricing not published".to_string());
    } else {
        differentiators.push("Transparent pricing".to_string());
    }

    (differentiators, weaknesses)
}

#[cfg(test)]
mod tests {
    use funnelscope_scraper::types::RawDocument;

    use super::*;

    fn signals_with(prices: &[&str], guarantees: &[&str]) -> ScrapedSignals {
        let mut s = ScrapedSignals::empty("https://competitor.example.com");
        s.prices = prices.iter().map(ToString::to_string).collect();
        s.guarantees = guarantees.iter().map(ToString::to_string).collect();
        s
    }

    #[test]
    fn premium_price_with_no_guarantee() {
        // £1,997 reaches four digits; zero guarantee text is a weakness.
        let signals = vec![signals_with(&["£1,997", "£497"], &[])];
        let intel = aggregate(&signals, None);
        assert_eq!(intel.price_positioning, PricePositioning::Premium);
        assert!(intel.weaknesses.contains(&"No clear guarantee".to_string()));
    }

    #[test]
    fn charm_pattern_is_premium_even_under_one_thousand() {
        let intel = aggregate(&[signals_with(&["£999"], &[])], None);
        assert_eq!(intel.price_positioning, PricePositioning::Premium);
    }

    #[test]
    fn low_prices_classify_budget() {
        let intel = aggregate(&[signals_with(&["£97", "£250"], &[])], None);
        assert_eq!(intel.price_positioning, PricePositioning::Budget);
    }

    #[test]
    fn mid_range_prices_classify_mid_market() {
        let intel = aggregate(&[signals_with(&["£650", "£750"], &[])], None);
        assert_eq!(intel.price_positioning, PricePositioning::MidMarket);
    }

    #[test]
    fn ties_resolve_toward_premium() {
        // Budget and premium evidence in the same corpus.
        let intel = aggregate(&[signals_with(&["£1,997", "£97"], &[])], None);
        assert_eq!(intel.price_positioning, PricePositioning::Premium);
    }

    #[test]
    fn no_prices_classify_mid_market_with_weakness() {
        let intel = aggregate(&[signals_with(&[], &[])], None);
        assert_eq!(intel.price_positioning, PricePositioning::MidMarket);
        assert!(intel.weaknesses.contains(&"Pricing not published".to_string()));
    }

    #[test]
    fn six_testimonials_become_a_differentiator() {
        let mut s = signals_with(&[], &[]);
        s.testimonials = (0..6).map(|i| format!("great clinic, review {i}")).collect();
        let intel = aggregate(&[s], None);
        assert!(intel
            .differentiators
            .contains(&"Strong social proof".to_string()));
    }

    #[test]
    fn known_facts_take_precedence() {
        let facts = KnownFacts {
            differentiators: vec!["Award-winning team".to_string()],
            weaknesses: vec![],
            price_positioning: Some(PricePositioning::Budget),
        };
        let intel = aggregate(&[signals_with(&["£1,997"], &[])], Some(&facts));
        assert_eq!(intel.price_positioning, PricePositioning::Budget);
        assert_eq!(intel.differentiators[0], "Award-winning team");
    }

    #[test]
    fn business_id_is_the_source_domain() {
        let doc = RawDocument {
            source_url: "https://www.sculpt.example.co.uk/offers".to_string(),
            html: String::new(),
            rendered: false,
        };
        let signals = vec![funnelscope_scraper::extract(&doc)];
        let intel = aggregate(&signals, None);
        assert_eq!(intel.business_id, "www.sculpt.example.co.uk");
    }

    #[test]
    fn empty_signal_slice_is_valid() {
        let intel = aggregate(&[], None);
        assert_eq!(intel.business_id, "unknown");
        assert_eq!(intel.price_positioning, PricePositioning::MidMarket);
    }

    #[test]
    fn parse_price_value_handles_separators() {
        assert_eq!(parse_price_value("£1,997"), Some(1997.0));
        assert_eq!(parse_price_value("1,200 USD"), Some(1200.0));
        assert_eq!(parse_price_value("£49.99"), Some(49.99));
        assert_eq!(parse_price_value("free"), None);
    }
}
