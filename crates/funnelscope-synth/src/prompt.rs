//! Prompt construction and model-response parsing.

use funnelscope_intel::CompetitorIntelligence;

use crate::offer::GeneratedOffer;

pub(crate) const SYSTEM_PROMPT: &str = "You are a direct-response offer strategist for \
local service businesses. You turn competitor intelligence into a single commercial offer. \
Respond with exactly one JSON object and nothing else: no prose, no markdown fences.";

/// Build the user prompt embedding the aggregated intelligence and the
/// required response shape.
#[must_use]
pub fn build_user_prompt(intel: &CompetitorIntelligence, industry_hint: Option<&str>) -> String {
    let intel_json =
        serde_json::to_string_pretty(intel).unwrap_or_else(|_| "{}".to_string());
    let industry = industry_hint.unwrap_or(&intel.business_type);
    let currency = intel.currency.code();

    format!(
        r#"Competitor intelligence for a {industry} business (all amounts in {currency}):

{intel_json}

Design an offer that undercuts this competitor's weaknesses. Return a JSON object with
exactly these fields:

{{
  "dream_outcome": string,
  "currency": "{currency}",
  "value_stack": [{{"item": string, "value": number, "description": string}}, ...],
  "pricing": {{"total_value": number, "offer_price": number, "payment_plan": number or null}},
  "guarantee": string,
  "urgency": string,
  "scarcity": string,
  "bonuses": [string, ...]
}}

Order value_stack by perceived value, highest first. offer_price must be well below
total_value. If the competitor lacks a guarantee, make yours unmissable."#
    )
}

/// Parse a model response into a validated, invariant-enforced offer.
///
/// Strips any code-fence wrapping, isolates the outermost JSON object,
/// parses it against the full schema, validates it structurally, and
/// enforces the pricing invariants.
///
/// # Errors
///
/// Returns a reason string on any failure; callers treat it identically to
/// provider unavailability.
pub fn parse_offer_json(raw: &str) -> Result<GeneratedOffer, String> {
    let stripped = strip_code_fences(raw);
    let json =
        isolate_object(stripped).ok_or_else(|| "no JSON object in response".to_string())?;

    let offer: GeneratedOffer =
        serde_json::from_str(json).map_err(|e| format!("response did not match schema: {e}"))?;
    offer.validate()?;
    Ok(offer.enforce_invariants())
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, then the closing fence.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.rsplit_once("```").map_or(body, |(body, _)| body).trim()
}

/// Slice from the first `{` to the last `}` so leading or trailing prose
/// does not break parsing.
fn isolate_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn offer_json() -> String {
        r#"{
            "dream_outcome": "A sculpted shape without surgery",
            "currency": "GBP",
            "value_stack": [
                {"item": "Programme", "value": 1200, "description": "Six sessions"},
                {"item": "Aftercare", "value": 300, "description": "Kit"}
            ],
            "pricing": {"total_value": 1500, "offer_price": 297, "payment_plan": 99},
            "guarantee": "Double your money back",
            "urgency": "Ends Friday",
            "scarcity": "Five slots",
            "bonuses": ["Priority booking"]
        }"#
        .to_string()
    }

    #[test]
    fn plain_json_parses() {
        let offer = parse_offer_json(&offer_json()).unwrap();
        assert_eq!(offer.pricing.offer_price, Decimal::from(297));
        assert_eq!(offer.value_stack.len(), 2);
    }

    #[test]
    fn fenced_json_parses() {
        let fenced = format!("```json\n{}\n```", offer_json());
        assert!(parse_offer_json(&fenced).is_ok());
    }

    #[test]
    fn json_with_surrounding_prose_parses() {
        let wrapped = format!("Here is your offer:\n{}\nLet me know!", offer_json());
        assert!(parse_offer_json(&wrapped).is_ok());
    }

    #[test]
    fn invariant_violating_response_is_clamped() {
        let raw = offer_json().replace("\"offer_price\": 297", "\"offer_price\": 2000");
        let offer = parse_offer_json(&raw).unwrap();
        assert_eq!(offer.pricing.offer_price, Decimal::from(300), "20% of 1500");
    }

    #[test]
    fn schema_mismatch_is_an_error() {
        assert!(parse_offer_json(r#"{"totally": "unrelated"}"#).is_err());
    }

    #[test]
    fn empty_value_stack_is_rejected() {
        let raw = offer_json().replace(
            r#""value_stack": [
                {"item": "Programme", "value": 1200, "description": "Six sessions"},
                {"item": "Aftercare", "value": 300, "description": "Kit"}
            ]"#,
            r#""value_stack": []"#,
        );
        assert!(parse_offer_json(&raw).is_err());
    }

    #[test]
    fn non_json_response_is_an_error() {
        assert!(parse_offer_json("Sorry, I can't help with that.").is_err());
    }

    #[test]
    fn user_prompt_embeds_intelligence_and_currency() {
        use funnelscope_core::Currency;
        use funnelscope_intel::{
            CompetitorIntelligence, CreativePatterns, FunnelStages, PricePositioning,
            SpendEstimate,
        };

        let intel = CompetitorIntelligence {
            business_id: "competitor.example.co.uk".to_string(),
            business_type: "Medical/Aesthetic Clinic".to_string(),
            currency: Currency::Gbp,
            price_positioning: PricePositioning::Premium,
            differentiators: vec![],
            weaknesses: vec!["No clear guarantee".to_string()],
            estimated_spend: SpendEstimate::none_observed(),
            creative_patterns: CreativePatterns::default(),
            funnel: FunnelStages::default(),
        };
        let prompt = build_user_prompt(&intel, None);
        assert!(prompt.contains("competitor.example.co.uk"));
        assert!(prompt.contains("No clear guarantee"));
        assert!(prompt.contains("\"GBP\""));
    }
}
