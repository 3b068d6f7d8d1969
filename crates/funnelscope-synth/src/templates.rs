//! Deterministic template mode.
//!
//! Value stacks are fixed per detected industry; the offer price is a
//! fixed fraction of the stacked value chosen by the pricing tier; the
//! guarantee, urgency, and scarcity lines are content data selected by the
//! competitor's detected weaknesses. Same intelligence in, same offer out.

use rust_decimal::Decimal;

use funnelscope_intel::CompetitorIntelligence;

use crate::offer::{GeneratedOffer, OfferPricing, ValueItem};

/// Pricing aggressiveness: the fraction of stacked value charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingTier {
    /// 20% of stacked value.
    Conservative,
    /// 15% of stacked value.
    Standard,
    /// 10% of stacked value.
    Aggressive,
}

impl PricingTier {
    #[must_use]
    pub fn fraction(self) -> Decimal {
        match self {
            PricingTier::Conservative => Decimal::new(20, 2),
            PricingTier::Standard => Decimal::new(15, 2),
            PricingTier::Aggressive => Decimal::new(10, 2),
        }
    }
}

struct IndustryTemplate {
    business_type: &'static str,
    dream_outcome: &'static str,
    /// (item, value in major currency units, description) in display
    /// order: highest perceived value first.
    stack: &'static [(&'static str, i64, &'static str)],
    bonuses: &'static [&'static str],
}

const TEMPLATES: &[IndustryTemplate] = &[
    IndustryTemplate {
        business_type: "Medical/Aesthetic Clinic",
        dream_outcome: "A visibly tighter, more sculpted shape without surgery or downtime",
        stack: &[
            (
                "Complete body transformation programme",
                1200,
                "Course of six clinic sessions tailored to your goals",
            ),
            (
                "Personalised treatment plan and body composition scan",
                250,
                "Mapped against your problem areas before the first session",
            ),
            (
                "Quarterly progress reviews",
                200,
                "Measured results at every milestone, adjusted as you change",
            ),
            (
                "Skin-firming aftercare kit",
                150,
                "Clinic-grade home care between sessions",
            ),
        ],
        bonuses: &[
            "Priority rebooking for course clients",
            "Partner discount on maintenance sessions",
        ],
    },
    IndustryTemplate {
        business_type: "Dental Practice",
        dream_outcome: "A smile you stop hiding in photos",
        stack: &[
            (
                "Full smile makeover assessment",
                450,
                "Digital scan, treatment simulation, and staged plan",
            ),
            (
                "Professional whitening course",
                350,
                "In-chair and take-home systems combined",
            ),
            (
                "Hygienist deep-clean and polish",
                120,
                "Scheduled before any cosmetic work begins",
            ),
        ],
        bonuses: &["Interest-free staging on treatment plans"],
    },
    IndustryTemplate {
        business_type: "Fitness Studio",
        dream_outcome: "A body transformation that actually holds past week six",
        stack: &[
            (
                "12-week coached transformation block",
                900,
                "Three coached sessions a week with progress testing",
            ),
            (
                "Personalised nutrition protocol",
                300,
                "Built around your schedule, reviewed fortnightly",
            ),
            (
                "Movement and mobility screen",
                150,
                "Baseline assessment before programming starts",
            ),
        ],
        bonuses: &["Guest passes for a training partner"],
    },
];

const FALLBACK_TEMPLATE: IndustryTemplate = IndustryTemplate {
    business_type: "Service Business",
    dream_outcome: "The outcome you came for, delivered without the usual runaround",
    stack: &[
        (
            "Done-for-you core service package",
            800,
            "Scoped, scheduled, and delivered end to end",
        ),
        (
            "Strategy and onboarding session",
            250,
            "A concrete plan before any work begins",
        ),
        (
            "30-day follow-up support",
            150,
            "Direct access while the results bed in",
        ),
    ],
    bonuses: &["Priority scheduling for returning clients"],
};

/// Synthesize a deterministic offer from aggregated intelligence.
///
/// The guarantee exploits a detected gap: a competitor with no clear
/// guarantee is countered with a double-money-back promise; otherwise a
/// standard risk-reversal line is used.
#[must_use]
pub fn synthesize(intel: &CompetitorIntelligence, tier: PricingTier) -> GeneratedOffer {
    let template = TEMPLATES
        .iter()
        .find(|t| t.business_type == intel.business_type)
        .unwrap_or(&FALLBACK_TEMPLATE);

    let symbol = intel.currency.symbol();

    let value_stack: Vec<ValueItem> = template
        .stack
        .iter()
        .map(|(item, value, description)| ValueItem {
            item: (*item).to_string(),
            value: Decimal::from(*value),
            description: format!("{description} (worth {symbol}{value})"),
        })
        .collect();

    let total_value: Decimal = value_stack.iter().map(|item| item.value).sum();
    let offer_price = (total_value * tier.fraction()).round_dp(2);
    let payment_plan = (offer_price / Decimal::from(3)).round_dp(2);

    let competitor_lacks_guarantee = intel
        .weaknesses
        .iter()
        .any(|w| w == "No clear guarantee");
    let guarantee = if competitor_lacks_guarantee {
        "See measurable results within 30 days or get double your money back".to_string()
    } else {
        "Full refund within your first 14 days, no questions asked".to_string()
    };

    let offer = GeneratedOffer {
        dream_outcome: template.dream_outcome.to_string(),
        currency: intel.currency,
        value_stack,
        pricing: OfferPricing {
            total_value,
            offer_price,
            payment_plan: Some(payment_plan),
        },
        guarantee,
        urgency: "Introductory pricing for new clients ends this month".to_string(),
        scarcity: "Only five consultation slots are released each week".to_string(),
        bonuses: template.bonuses.iter().map(ToString::to_string).collect(),
    };

    offer.enforce_invariants()
}

#[cfg(test)]
mod tests {
    use funnelscope_core::Currency;
    use funnelscope_intel::{
        CompetitorIntelligence, CreativePatterns, FunnelStages, PricePositioning, SpendEstimate,
    };

    use super::*;

    fn intel(business_type: &str, currency: Currency, weaknesses: &[&str]) -> CompetitorIntelligence {
        CompetitorIntelligence {
            business_id: "competitor.example.com".to_string(),
            business_type: business_type.to_string(),
            currency,
            price_positioning: PricePositioning::Premium,
            differentiators: vec![],
            weaknesses: weaknesses.iter().map(ToString::to_string).collect(),
            estimated_spend: SpendEstimate::none_observed(),
            creative_patterns: CreativePatterns::default(),
            funnel: FunnelStages::default(),
        }
    }

    #[test]
    fn clinic_template_prices_at_the_tier_fraction() {
        let offer = synthesize(
            &intel("Medical/Aesthetic Clinic", Currency::Gbp, &[]),
            PricingTier::Standard,
        );
        assert_eq!(offer.pricing.total_value, Decimal::from(1800));
        assert_eq!(offer.pricing.offer_price, Decimal::from(270), "15% of 1800");
        assert!(offer.pricing.offer_price < offer.pricing.total_value);
    }

    #[test]
    fn tiers_change_only_the_fraction() {
        let i = intel("Medical/Aesthetic Clinic", Currency::Gbp, &[]);
        let conservative = synthesize(&i, PricingTier::Conservative);
        let aggressive = synthesize(&i, PricingTier::Aggressive);
        assert_eq!(conservative.pricing.offer_price, Decimal::from(360));
        assert_eq!(aggressive.pricing.offer_price, Decimal::from(180));
        assert_eq!(
            conservative.pricing.total_value,
            aggressive.pricing.total_value
        );
    }

    #[test]
    fn total_equals_stack_sum() {
        let offer = synthesize(
            &intel("Fitness Studio", Currency::Usd, &[]),
            PricingTier::Standard,
        );
        assert_eq!(offer.pricing.total_value, offer.stack_total());
    }

    #[test]
    fn missing_guarantee_weakness_is_countered_with_double_money_back() {
        let offer = synthesize(
            &intel("Medical/Aesthetic Clinic", Currency::Gbp, &["No clear guarantee"]),
            PricingTier::Standard,
        );
        assert!(offer.guarantee.contains("double your money back"));
    }

    #[test]
    fn guaranteed_competitor_gets_the_standard_risk_reversal() {
        let offer = synthesize(
            &intel("Medical/Aesthetic Clinic", Currency::Gbp, &[]),
            PricingTier::Standard,
        );
        assert!(offer.guarantee.contains("Full refund"));
    }

    #[test]
    fn currency_flavors_the_stack_copy() {
        let offer = synthesize(
            &intel("Medical/Aesthetic Clinic", Currency::Gbp, &[]),
            PricingTier::Standard,
        );
        assert_eq!(offer.currency, Currency::Gbp);
        assert!(offer.value_stack[0].description.contains('£'));
    }

    #[test]
    fn unknown_business_type_uses_the_fallback_template() {
        let offer = synthesize(
            &intel("Falconry School", Currency::Eur, &[]),
            PricingTier::Standard,
        );
        assert_eq!(offer.pricing.total_value, Decimal::from(1200));
        assert!(offer.value_stack[0].description.contains('€'));
    }

    #[test]
    fn stack_is_ordered_highest_value_first() {
        let offer = synthesize(
            &intel("Medical/Aesthetic Clinic", Currency::Gbp, &[]),
            PricingTier::Standard,
        );
        for pair in offer.value_stack.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
    }

    #[test]
    fn identical_intelligence_produces_identical_offers() {
        let i = intel("Medical/Aesthetic Clinic", Currency::Gbp, &["No clear guarantee"]);
        let a = synthesize(&i, PricingTier::Standard);
        let b = synthesize(&i, PricingTier::Standard);
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }
}
