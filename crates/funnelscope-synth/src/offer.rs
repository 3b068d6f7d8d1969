//! The generated-offer schema and its invariants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use funnelscope_core::Currency;

/// One line of the value stack. Display order is meaningful: highest
/// perceived value first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueItem {
    pub item: String,
    pub value: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferPricing {
    pub total_value: Decimal,
    pub offer_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<Decimal>,
}

/// A synthesized commercial offer. Immutable once returned; persistence is
/// the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedOffer {
    pub dream_outcome: String,
    pub currency: Currency,
    pub value_stack: Vec<ValueItem>,
    pub pricing: OfferPricing,
    pub guarantee: String,
    pub urgency: String,
    pub scarcity: String,
    #[serde(default)]
    pub bonuses: Vec<String>,
}

impl GeneratedOffer {
    /// Structural validation applied to model responses before the offer is
    /// accepted. A failure here is treated exactly like provider
    /// unavailability: it triggers the next fallback.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason on the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.dream_outcome.trim().is_empty() {
            return Err("dream_outcome is empty".to_string());
        }
        if self.value_stack.is_empty() {
            return Err("value_stack is empty".to_string());
        }
        if self.value_stack.iter().any(|item| item.value <= Decimal::ZERO) {
            return Err("value_stack contains a non-positive value".to_string());
        }
        if self.guarantee.trim().is_empty() {
            return Err("guarantee is empty".to_string());
        }
        Ok(())
    }

    /// Enforce the pricing invariants on an offer from any mode:
    ///
    /// - a missing/zero `total_value` is derived as the stack sum;
    /// - `offer_price` must be strictly less than `total_value`, otherwise
    ///   it is clamped to 20% of `total_value`.
    #[must_use]
    pub fn enforce_invariants(mut self) -> Self {
        if self.pricing.total_value <= Decimal::ZERO {
            self.pricing.total_value = self.stack_total();
        }

        if self.pricing.offer_price >= self.pricing.total_value
            || self.pricing.offer_price <= Decimal::ZERO
        {
            self.pricing.offer_price =
                (self.pricing.total_value * Decimal::new(20, 2)).round_dp(2);
        }

        if let Some(plan) = self.pricing.payment_plan {
            if plan >= self.pricing.offer_price || plan <= Decimal::ZERO {
                self.pricing.payment_plan = None;
            }
        }

        self
    }

    #[must_use]
    pub fn stack_total(&self) -> Decimal {
        self.value_stack.iter().map(|item| item.value).sum()
    }
}
