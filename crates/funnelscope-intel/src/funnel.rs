//! Funnel reconstruction: regroups extracted creative lines into the four
//! classic stages. No new computation happens here; candidates are
//! filtered by stage keyword tables and relabeled.

use crate::{dedupe_cap, FunnelStages};

const MAX_PER_STAGE: usize = 10;

/// Phrases that mark a line as pain-point (interest-stage) messaging.
pub const PAIN_KEYWORDS: &[&str] = &[
    "tired of",
    "struggle",
    "struggling",
    "frustrated",
    "embarrassed",
    "self-conscious",
    "stubborn",
    "can't shift",
    "cannot shift",
    "won't budge",
    "hate",
];

/// Phrases that mark a line as core-offer (consideration-stage) messaging.
pub const OFFER_KEYWORDS: &[&str] = &[
    "free consultation",
    "free assessment",
    "% off",
    "half price",
    "save",
    "package",
    "course of",
    "from £",
    "from $",
    "from €",
    "only £",
    "only $",
    "only €",
];

/// Regroup extracted lines into funnel stages:
/// hooks → awareness, pain points → interest, core offers → consideration,
/// guarantees + CTAs → conversion.
#[must_use]
pub fn reverse_engineer_funnel(
    hooks: &[String],
    pain_candidates: &[String],
    offer_candidates: &[String],
    guarantees: &[String],
    ctas: &[String],
) -> FunnelStages {
    let interest = pain_candidates
        .iter()
        .filter(|line| matches_any(line, PAIN_KEYWORDS))
        .cloned()
        .collect();

    let consideration = offer_candidates
        .iter()
        .filter(|line| matches_any(line, OFFER_KEYWORDS))
        .cloned()
        .collect();

    let mut conversion: Vec<String> = guarantees.to_vec();
    conversion.extend(ctas.iter().cloned());

    FunnelStages {
        awareness: dedupe_cap(hooks.to_vec(), MAX_PER_STAGE),
        interest: dedupe_cap(interest, MAX_PER_STAGE),
        consideration: dedupe_cap(consideration, MAX_PER_STAGE),
        conversion: dedupe_cap(conversion, MAX_PER_STAGE),
    }
}

fn matches_any(line: &str, keywords: &[&str]) -> bool {
    let lower = line.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}
