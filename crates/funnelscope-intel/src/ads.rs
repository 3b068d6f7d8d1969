//! Ad-corpus aggregation: spend estimation, creative patterns, and funnel
//! reconstruction over a competitor's active ads.

use funnelscope_adlib::AdRecord;
use funnelscope_core::Currency;
use funnelscope_scraper::extract_price_tokens;
use funnelscope_scraper::keywords::{contains_any, GUARANTEE_KEYWORDS, TESTIMONIAL_KEYWORDS};

use crate::aggregate::classify_price_positioning;
use crate::funnel::reverse_engineer_funnel;
use crate::{
    dedupe_cap, CompetitorIntelligence, CreativePatterns, SpendEstimate, SpendLevel,
};

const MAX_PRICES: usize = 10;

/// Aggregate a competitor's ad corpus into an intelligence record.
///
/// `business_id` is the ad-library page id or the search term that produced
/// the corpus.
#[must_use]
pub fn aggregate_ads(business_id: &str, ads: &[AdRecord]) -> CompetitorIntelligence {
    let texts: Vec<String> = ads.iter().map(|ad| ad.ad_text.clone()).collect();

    let mut prices = Vec::new();
    for text in &texts {
        prices.extend(extract_price_tokens(text));
    }
    let prices = dedupe_cap(prices, MAX_PRICES);

    let guarantees: Vec<String> = lines_matching(&texts, GUARANTEE_KEYWORDS);
    let hooks: Vec<String> = texts.iter().filter_map(|t| first_line(t)).collect();
    let sentences: Vec<String> = texts.iter().flat_map(|t| split_sentences(t)).collect();
    let ctas: Vec<String> = ads.iter().filter_map(|ad| ad.cta_label.clone()).collect();

    let business_type = ads
        .first()
        .map_or_else(
            || funnelscope_scraper::extract::DEFAULT_BUSINESS_TYPE.to_string(),
            |ad| classify_advertiser(&ad.advertiser_name, &texts),
        );

    let (differentiators, weaknesses) = derive_ad_traits(&guarantees, &texts);

    CompetitorIntelligence {
        business_id: business_id.to_string(),
        business_type,
        currency: infer_currency(&prices),
        price_positioning: classify_price_positioning(&prices),
        differentiators,
        weaknesses,
        estimated_spend: estimate_spend(ads.len()),
        creative_patterns: detect_creative_patterns(ads, &texts),
        funnel: reverse_engineer_funnel(&hooks, &sentences, &sentences, &guarantees, &ctas),
    }
}

/// Spend estimate from active ad count: more than 10 concurrent ads
/// indicates sustained high spend, more than 5 medium, else low.
#[must_use]
pub fn estimate_spend(ad_count: usize) -> SpendEstimate {
    let level = if ad_count > 10 {
        SpendLevel::High
    } else if ad_count > 5 {
        SpendLevel::Medium
    } else {
        SpendLevel::Low
    };
    SpendEstimate {
        level,
        reasoning: format!("{ad_count} active ads in the transparency library"),
    }
}

fn detect_creative_patterns(ads: &[AdRecord], texts: &[String]) -> CreativePatterns {
    let has_video = ads.iter().any(|ad| ad.has_video);
    let has_before_after = texts.iter().any(|t| {
        let lower = t.to_lowercase();
        lower.contains("before") && lower.contains("after")
    });
    let has_social_proof = texts
        .iter()
        .any(|t| contains_any(&t.to_lowercase(), TESTIMONIAL_KEYWORDS));

    let visual_style = if has_before_after {
        "transformation-led"
    } else if has_video {
        "video-led"
    } else {
        "static"
    };

    CreativePatterns {
        has_video,
        has_before_after,
        has_social_proof,
        visual_style: visual_style.to_string(),
    }
}

fn derive_ad_traits(guarantees: &[String], texts: &[String]) -> (Vec<String>, Vec<String>) {
    let mut differentiators = Vec::new();
    let mut weaknesses = Vec::new();

    if guarantees.is_empty() {
        weaknesses.push("No clear guarantee".to_string());
    } else {
        differentiators.push("Guarantee-backed offer".to_string());
    }

    if texts
        .iter()
        .any(|t| contains_any(&t.to_lowercase(), TESTIMONIAL_KEYWORDS))
    {
        differentiators.push("Social proof in creatives".to_string());
    } else {
        weaknesses.push("No social proof in creatives".to_string());
    }

    (differentiators, weaknesses)
}

/// Classify the advertiser from its name first, then its creative corpus.
fn classify_advertiser(name: &str, texts: &[String]) -> String {
    let mut haystack = name.to_lowercase();
    for text in texts {
        haystack.push(' ');
        haystack.push_str(&text.to_lowercase());
    }
    for (keyword, label) in funnelscope_scraper::keywords::BUSINESS_TYPE_RULES {
        if haystack.contains(keyword) {
            return (*label).to_string();
        }
    }
    funnelscope_scraper::extract::DEFAULT_BUSINESS_TYPE.to_string()
}

fn infer_currency(prices: &[String]) -> Currency {
    for token in prices {
        if token.contains('£') || token.contains("GBP") {
            return Currency::Gbp;
        }
        if token.contains('€') || token.contains("EUR") {
            return Currency::Eur;
        }
        if token.contains('$') || token.contains("USD") {
            return Currency::Usd;
        }
    }
    Currency::Usd
}

fn lines_matching(texts: &[String], keywords: &[&str]) -> Vec<String> {
    texts
        .iter()
        .flat_map(|t| split_sentences(t))
        .filter(|s| contains_any(&s.to_lowercase(), keywords))
        .collect()
}

/// First sentence or line of an ad text, trimmed to a hook-sized length.
fn first_line(text: &str) -> Option<String> {
    let line = text
        .split(['\n', '.', '!', '?'])
        .map(str::trim)
        .find(|s| !s.is_empty())?;
    let hook: String = line.chars().take(120).collect();
    Some(hook)
}

fn split_sentences(text: &str) -> Vec<String> {
    text.split(['\n', '.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.len() >= 10)
        .map(ToString::to_string)
        .collect()
}
