//! Signal extraction: deterministic text/DOM heuristics, no learning.
//!
//! Zero matches in any category is valid output — an empty sequence, never
//! an error.

use regex::Regex;

use funnelscope_core::{host_of, Currency};

use crate::keywords::{
    contains_any, BUSINESS_TYPE_RULES, FEATURE_KEYWORDS, GUARANTEE_KEYWORDS,
    TESTIMONIAL_KEYWORDS, URGENCY_KEYWORDS,
};
use crate::types::{RawDocument, ScrapedSignals};

pub const DEFAULT_BUSINESS_TYPE: &str = "Service Business";

/// Prices carry the heaviest downstream weight, so they get a tighter cap
/// than the text categories.
const MAX_PRICES: usize = 10;
const MAX_PER_CATEGORY: usize = 20;

/// Extract typed marketing signals from a fetched document.
#[must_use]
pub fn extract(doc: &RawDocument) -> ScrapedSignals {
    let stripped = strip_non_content(&doc.html);
    let full_text = clean_text(&stripped);
    let full_text_lower = full_text.to_lowercase();
    let segments = visible_text_segments(&stripped);

    let mut features = Vec::new();
    let mut testimonials = Vec::new();
    let mut guarantees = Vec::new();
    let mut urgency_phrases = Vec::new();

    for segment in &segments {
        let lower = segment.to_lowercase();
        let len = segment.len();

        if (10..=200).contains(&len) && contains_any(&lower, GUARANTEE_KEYWORDS) {
            guarantees.push(segment.clone());
        }
        if (5..=120).contains(&len) && contains_any(&lower, URGENCY_KEYWORDS) {
            urgency_phrases.push(segment.clone());
        }
        if (20..=300).contains(&len) && contains_any(&lower, TESTIMONIAL_KEYWORDS) {
            testimonials.push(segment.clone());
        }
        if (10..=150).contains(&len) && contains_any(&lower, FEATURE_KEYWORDS) {
            features.push(segment.clone());
        }
    }

    ScrapedSignals {
        source_url: doc.source_url.clone(),
        currency: detect_currency(&doc.source_url, &full_text),
        prices: extract_price_tokens(&full_text),
        headlines: dedupe_cap(extract_headlines(&stripped), MAX_PER_CATEGORY),
        features: dedupe_cap(features, MAX_PER_CATEGORY),
        testimonials: dedupe_cap(testimonials, MAX_PER_CATEGORY),
        guarantees: dedupe_cap(guarantees, MAX_PER_CATEGORY),
        urgency_phrases: dedupe_cap(urgency_phrases, MAX_PER_CATEGORY),
        cta_labels: dedupe_cap(extract_cta_labels(&stripped), MAX_PER_CATEGORY),
        business_type: classify_business_type(&full_text_lower),
    }
}

/// Extract raw price tokens from free text, in document order, deduplicated
/// and capped at 10.
///
/// The regex family covers `⟨symbol⟩⟨amount⟩`, `⟨amount⟩ ⟨code⟩`, and
/// qualifier-prefixed forms like "from £1,997" (the token kept is the
/// symbol+amount part).
#[must_use]
pub fn extract_price_tokens(text: &str) -> Vec<String> {
    let symbol_re = Regex::new(r"[£$€]\s?\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?")
        .expect("valid symbol price regex");
    let code_re = Regex::new(r"\b\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?\s?(?:GBP|USD|EUR)\b")
        .expect("valid code price regex");
    let phrase_re =
        Regex::new(r"(?i)\b(?:from|only|just)\s+([£$€]\s?\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?)")
            .expect("valid phrase price regex");

    let mut found: Vec<(usize, String)> = Vec::new();
    for m in symbol_re.find_iter(text) {
        found.push((m.start(), m.as_str().to_string()));
    }
    for m in code_re.find_iter(text) {
        found.push((m.start(), m.as_str().to_string()));
    }
    for cap in phrase_re.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            found.push((m.start(), m.as_str().to_string()));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    dedupe_cap(found.into_iter().map(|(_, token)| token).collect(), MAX_PRICES)
}

/// Currency detection: the domain TLD hint wins ties with body symbols; an
/// unambiguous body contradiction (foreign-symbol prices present, native
/// symbol absent) overrides the hint.
fn detect_currency(source_url: &str, text: &str) -> Currency {
    let gbp = count_symbol_prices(text, '£');
    let usd = count_symbol_prices(text, '$');
    let eur = count_symbol_prices(text, '€');

    let hint = host_of(source_url).and_then(|h| Currency::from_domain_hint(&h));

    if let Some(hinted) = hint {
        let native = match hinted {
            Currency::Gbp => gbp,
            Currency::Usd => usd,
            Currency::Eur => eur,
        };
        if native == 0 && gbp + usd + eur > 0 {
            return body_majority(gbp, usd, eur);
        }
        return hinted;
    }

    if gbp + usd + eur > 0 {
        return body_majority(gbp, usd, eur);
    }
    Currency::Usd
}

fn count_symbol_prices(text: &str, symbol: char) -> usize {
    let re = Regex::new(&format!(
        r"{}\s?\d{{1,3}}(?:,\d{{3}})*(?:\.\d{{1,2}})?",
        regex::escape(&symbol.to_string())
    ))
    .expect("valid currency count regex");
    re.find_iter(text).count()
}

fn body_majority(gbp: usize, usd: usize, eur: usize) -> Currency {
    if gbp >= usd && gbp >= eur && gbp > 0 {
        Currency::Gbp
    } else if eur > usd {
        Currency::Eur
    } else {
        Currency::Usd
    }
}

fn extract_headlines(html: &str) -> Vec<String> {
    let re = Regex::new(r"(?is)<h[1-3][^>]*>(.*?)</h[1-3]>").expect("valid heading regex");
    re.captures_iter(html)
        .filter_map(|cap| cap.get(1).map(|m| clean_text(m.as_str())))
        .filter(|t| (5..=200).contains(&t.len()))
        .collect()
}

fn extract_cta_labels(html: &str) -> Vec<String> {
    let button_re = Regex::new(r"(?is)<button[^>]*>(.*?)</button>").expect("valid button regex");
    let link_re = Regex::new(
        r#"(?is)<a\s[^>]*class\s*=\s*["'][^"']*(?:btn|button|cta)[^"']*["'][^>]*>(.*?)</a>"#,
    )
    .expect("valid button-link regex");

    let mut labels: Vec<String> = Vec::new();
    for re in [&button_re, &link_re] {
        for cap in re.captures_iter(html) {
            if let Some(m) = cap.get(1) {
                let text = clean_text(m.as_str());
                if (2..=50).contains(&text.len()) {
                    labels.push(text);
                }
            }
        }
    }
    labels
}

/// Classify free text (an industry hint, an advertiser name) into a
/// business-type label using the same table as document classification.
#[must_use]
pub fn classify_business_text(text: &str) -> String {
    classify_business_type(&text.to_lowercase())
}

/// First matching keyword in the classification table wins.
fn classify_business_type(text_lower: &str) -> String {
    for (keyword, label) in BUSINESS_TYPE_RULES {
        if text_lower.contains(keyword) {
            return (*label).to_string();
        }
    }
    DEFAULT_BUSINESS_TYPE.to_string()
}

/// Removes script/style/noscript blocks and HTML comments — everything that
/// carries no visible text.
fn strip_non_content(html: &str) -> String {
    let blocks = Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
        .expect("valid block-strip regex");
    let comments = Regex::new(r"(?s)<!--.*?-->").expect("valid comment-strip regex");
    let no_blocks = blocks.replace_all(html, " ");
    comments.replace_all(&no_blocks, " ").into_owned()
}

/// Splits markup into per-node text segments: tags become boundaries, each
/// segment is whitespace-collapsed.
fn visible_text_segments(html: &str) -> Vec<String> {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    tags.replace_all(html, "\n")
        .split('\n')
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_text(input: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let no_tags = tags.replace_all(input, " ");
    no_tags
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Set-semantics dedup that preserves first-seen (document) order, then
/// truncates to `cap`.
fn dedupe_cap(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
        if out.len() == cap {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str, html: &str) -> RawDocument {
        RawDocument {
            source_url: url.to_string(),
            html: html.to_string(),
            rendered: false,
        }
    }

    #[test]
    fn empty_document_yields_empty_sequences() {
        let signals = extract(&doc("https://example.com", "<html><body></body></html>"));
        assert!(signals.prices.is_empty());
        assert!(signals.headlines.is_empty());
        assert!(signals.features.is_empty());
        assert!(signals.testimonials.is_empty());
        assert!(signals.guarantees.is_empty());
        assert!(signals.urgency_phrases.is_empty());
        assert!(signals.cta_labels.is_empty());
        assert_eq!(signals.business_type, DEFAULT_BUSINESS_TYPE);
    }

    #[test]
    fn price_tokens_keep_document_order_and_dedupe() {
        let tokens =
            extract_price_tokens("Packages from £1,997 or £497 per session. Was £1,997.");
        assert_eq!(tokens, vec!["£1,997".to_string(), "£497".to_string()]);
    }

    #[test]
    fn price_tokens_match_code_suffix_form() {
        let tokens = extract_price_tokens("Pay 250 GBP upfront or 1,200 USD total");
        assert_eq!(tokens, vec!["250 GBP".to_string(), "1,200 USD".to_string()]);
    }

    #[test]
    fn price_tokens_cap_at_ten() {
        let text = (1..=15)
            .map(|i| format!("£{i}0"))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(extract_price_tokens(&text).len(), 10);
    }

    #[test]
    fn uk_domain_without_body_prices_detects_gbp() {
        let signals = extract(&doc(
            "https://clinic.example.co.uk",
            "<h1>Body Contouring Clinic</h1><p>Book a consultation</p>",
        ));
        assert_eq!(signals.currency, Currency::Gbp);
    }

    #[test]
    fn uk_domain_with_only_dollar_prices_is_overridden() {
        let signals = extract(&doc(
            "https://clinic.example.co.uk",
            "<p>Sessions are $500 or $1,200 for a course</p>",
        ));
        assert_eq!(signals.currency, Currency::Usd);
    }

    #[test]
    fn uk_domain_hint_wins_when_pound_prices_present() {
        let signals = extract(&doc(
            "https://clinic.example.co.uk",
            "<p>£500 here, partner offer $500 there</p>",
        ));
        assert_eq!(signals.currency, Currency::Gbp);
    }

    #[test]
    fn headlines_filter_by_length() {
        let html = "<h1>Hi</h1><h2>Transform your body in 6 weeks</h2><h3>ok?</h3>";
        let signals = extract(&doc("https://example.com", html));
        assert_eq!(
            signals.headlines,
            vec!["Transform your body in 6 weeks".to_string()]
        );
    }

    #[test]
    fn guarantees_and_urgency_are_categorized() {
        let html = r"
            <p>Full money back guarantee if you see no results.</p>
            <div>Only 3 spots left this month, book now.</div>
        ";
        let signals = extract(&doc("https://example.com", html));
        assert_eq!(signals.guarantees.len(), 1);
        assert!(signals.guarantees[0].contains("money back"));
        assert_eq!(signals.urgency_phrases.len(), 1);
    }

    #[test]
    fn cta_labels_come_from_buttons_and_button_links() {
        let html = r#"
            <button>Book Free Consultation</button>
            <a class="btn btn-primary" href="/start">Get Started</a>
            <a href="/other">A plain link that is definitely far too long to be a call to action label</a>
        "#;
        let signals = extract(&doc("https://example.com", html));
        assert!(signals.cta_labels.contains(&"Book Free Consultation".to_string()));
        assert!(signals.cta_labels.contains(&"Get Started".to_string()));
        assert_eq!(signals.cta_labels.len(), 2);
    }

    #[test]
    fn business_type_first_match_wins() {
        let signals = extract(&doc(
            "https://example.com",
            "<p>An aesthetic clinic with a fitness studio attached</p>",
        ));
        assert_eq!(signals.business_type, "Medical/Aesthetic Clinic");
    }

    #[test]
    fn script_and_style_content_is_ignored() {
        let html = r"
            <script>var price = '£999';</script>
            <style>.x { content: 'guarantee'; }</style>
            <p>No offers here</p>
        ";
        let signals = extract(&doc("https://example.com", html));
        assert!(signals.prices.is_empty());
        assert!(signals.guarantees.is_empty());
    }

    #[test]
    fn testimonial_segments_need_minimum_length() {
        let html = r"
            <p>review</p>
            <p>I cannot recommend this clinic enough, amazing results after four sessions.</p>
        ";
        let signals = extract(&doc("https://example.com", html));
        assert_eq!(signals.testimonials.len(), 1);
    }
}
