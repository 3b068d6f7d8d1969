//! Category keyword tables — the tunable heuristic surface of the
//! extractor. These are data: adjust the lists, not the scan logic.
//!
//! All matching is done against lowercased text with substring semantics,
//! so multi-word entries act as phrases and short entries should be chosen
//! to avoid accidental substrings.

pub const GUARANTEE_KEYWORDS: &[&str] = &[
    "guarantee",
    "guaranteed",
    "refund",
    "risk-free",
    "risk free",
    "money back",
    "money-back",
    "satisfaction",
    "no quibble",
];

pub const URGENCY_KEYWORDS: &[&str] = &[
    "limited time",
    "limited spots",
    "today only",
    "this week only",
    "ends soon",
    "ends ",
    "hurry",
    "last chance",
    "act now",
    "expires",
    "don't miss",
    "while stocks last",
    "spaces left",
    "spots left",
    "book now",
];

pub const TESTIMONIAL_KEYWORDS: &[&str] = &[
    "testimonial",
    "review",
    "recommend",
    "5 star",
    "five star",
    "so happy",
    "amazing results",
    "changed my life",
    "life-changing",
    "best decision",
    "thank you",
];

pub const FEATURE_KEYWORDS: &[&str] = &[
    "treatment",
    "session",
    "includes",
    "consultation",
    "non-invasive",
    "non-surgical",
    "pain-free",
    "painless",
    "fda",
    "certified",
    "award",
    "technology",
    "results in",
    "no downtime",
];

/// Ordered business-type classification table; first match wins.
pub const BUSINESS_TYPE_RULES: &[(&str, &str)] = &[
    ("body contour", "Medical/Aesthetic Clinic"),
    ("clinic", "Medical/Aesthetic Clinic"),
    ("aesthetic", "Medical/Aesthetic Clinic"),
    ("cosmetic", "Medical/Aesthetic Clinic"),
    ("med spa", "Medical/Aesthetic Clinic"),
    ("medspa", "Medical/Aesthetic Clinic"),
    ("medical", "Medical/Aesthetic Clinic"),
    ("dentist", "Dental Practice"),
    ("dental", "Dental Practice"),
    ("orthodont", "Dental Practice"),
    ("physio", "Health & Rehabilitation"),
    ("chiropract", "Health & Rehabilitation"),
    ("personal training", "Fitness Studio"),
    ("fitness", "Fitness Studio"),
    ("gym", "Fitness Studio"),
    ("salon", "Beauty Salon"),
    ("barber", "Beauty Salon"),
    ("law firm", "Law Firm"),
    ("solicitor", "Law Firm"),
    ("attorney", "Law Firm"),
    ("accountant", "Accounting Firm"),
    ("bookkeeping", "Accounting Firm"),
    ("estate agent", "Real Estate Agency"),
    ("real estate", "Real Estate Agency"),
    ("realtor", "Real Estate Agency"),
    ("roofing", "Home Services"),
    ("plumbing", "Home Services"),
    ("landscaping", "Home Services"),
];

/// Returns `true` when `text_lower` contains any keyword from `keywords`.
#[must_use]
pub fn contains_any(text_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text_lower.contains(k))
}
