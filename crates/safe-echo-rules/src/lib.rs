#![warn(missing_docs)]
//! # safe-echo-rules
//!
//! ## Purpose
//! Deterministic keyword and category matching with human-readable
//! explanations, written for a reader aged 8 to 80.
//!
//! ## Responsibilities
//! - Scan text against an ordered table of scam categories.
//! - Expose the full and reduced keyword vocabularies used by the decision
//!   engine's fallback path.
//!
//! ## Data flow
//! The decision engine calls [`explain`] to attach a categorized explanation
//! to a model flag, and [`match_keyword`] to run the keyword fallback when
//! the model is absent, errored, or undecided.
//!
//! ## Ownership and lifetimes
//! All rule data is `'static`; matching borrows the input text and allocates
//! only one lowercased copy per call.
//!
//! ## Error model
//! Matching is infallible. "No match" is expressed as `None`, which callers
//! must treat distinctly from an explanation that denies scam.
//!
//! ## Security and privacy notes
//! This crate never logs or stores the scanned text.

use safe_echo_core::CallerContext;

/// Semantic scam category recognized by the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScamCategory {
    /// Pressure to move money through irreversible channels.
    MoneyTransfer,
    /// Attempts to steal passwords or account access.
    CredentialPhishing,
    /// Fear and time pressure to short-circuit judgment.
    UrgencyFear,
    /// Emotional manipulation by an online "partner".
    Romance,
    /// Guaranteed-returns investment pitches.
    Investment,
    /// Vendor-impersonating fake technical support.
    TechSupport,
}

/// One row of the ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    /// Semantic category this rule detects.
    pub category: ScamCategory,
    /// Lowercase trigger substrings; any one of them matches.
    pub triggers: &'static [&'static str],
    /// Canned explanation shown to the protected user and caregiver.
    pub message: &'static str,
}

/// Categorized explanation for a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explanation {
    /// Matched category.
    pub category: ScamCategory,
    /// Canned explanation message.
    pub message: &'static str,
}

/// Ordered rule table; earlier rows win.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: ScamCategory::MoneyTransfer,
        triggers: &["western union", "gift card", "wire transfer"],
        message: "Money danger: a stranger is asking you to send money. \
                  Real companies never ask for gift cards or wire transfers.",
    },
    CategoryRule {
        category: ScamCategory::CredentialPhishing,
        triggers: &["password", "verify", "login", "account is locked"],
        message: "Account risk: someone is trying to steal your password. \
                  Never click links that ask you to log in.",
    },
    CategoryRule {
        category: ScamCategory::UrgencyFear,
        triggers: &["urgent", "immediately", "warrant", "jail", "suspended"],
        message: "Panic trick: scammers use scary words like 'urgent' or 'jail' \
                  to make you act without thinking. Take a deep breath.",
    },
    CategoryRule {
        category: ScamCategory::Romance,
        triggers: &["soulmate", "destiny", "love you", "my love"],
        message: "Romance scam: be careful when someone you met online asks \
                  for money. Real love does not cost 500 dollars.",
    },
    CategoryRule {
        category: ScamCategory::Investment,
        triggers: &["investment", "returns", "profit", "fund"],
        message: "Too good to be true: if they promise you will get rich \
                  quick, it is a lie. Keep your money safe.",
    },
    CategoryRule {
        category: ScamCategory::TechSupport,
        triggers: &["security patch", "microsoft", "admin access", "virus"],
        message: "Fake support: Microsoft will never call or email you to fix \
                  your computer. Do not let them control your screen.",
    },
];

/// Full scam keyword vocabulary applied to unknown senders.
pub const FULL_KEYWORDS: &[&str] = &[
    "urgent",
    "bank",
    "verify",
    "password",
    "ssn",
    "gift card",
    "compromised",
    "jail",
    "warrant",
    "western union",
    "visa fee",
    "soulmate",
    "destiny",
    "flight delayed",
    "investment",
    "returns",
    "ticker",
    "security patch",
    "admin access",
    "support line",
    "microsoft",
    "diagnostic tool",
    "otp",
    "cvv",
    "lottery",
    "prize",
    "click here",
    "winner",
    "cash",
    "refund",
    "blocked",
    "suspended",
    "kyc",
    "pan card",
    "aadhar",
    "sim card",
    "electricity",
    "ransom",
    "arrest",
    "transfer",
    "upi",
    "gpay",
    "paytm",
    "lost phone",
    "new number",
];

/// Reduced high-danger vocabulary applied to saved contacts.
pub const REDUCED_KEYWORDS: &[&str] = &["password", "ssn", "cvv", "otp"];

/// Returns the first-match categorized explanation for `text`.
///
/// Matching is case-insensitive substring scan in table order. Returns `None`
/// when no category matches; callers must not conflate that with "safe".
pub fn explain(text: &str) -> Option<Explanation> {
    let lower = text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.triggers.iter().any(|trigger| lower.contains(trigger)))
        .map(|rule| Explanation {
            category: rule.category,
            message: rule.message,
        })
}

/// Returns the context-appropriate keyword vocabulary.
pub fn keyword_set(context: CallerContext) -> &'static [&'static str] {
    if context.is_saved_contact {
        REDUCED_KEYWORDS
    } else {
        FULL_KEYWORDS
    }
}

/// Returns the first keyword from the context-appropriate vocabulary found in
/// `text`, case-insensitively.
pub fn match_keyword(text: &str, context: CallerContext) -> Option<&'static str> {
    let lower = text.to_lowercase();
    keyword_set(context)
        .iter()
        .find(|keyword| lower.contains(**keyword))
        .copied()
}

#[cfg(test)]
mod tests {
    //! Unit tests for per-category matching and vocabulary selection.

    use super::*;

    #[test]
    fn each_category_matches_its_triggers() {
        let cases = [
            ("Buy a gift card now", ScamCategory::MoneyTransfer),
            ("please verify your account", ScamCategory::CredentialPhishing),
            ("act immediately or face jail", ScamCategory::UrgencyFear),
            ("you are my soulmate", ScamCategory::Romance),
            ("guaranteed returns on this fund", ScamCategory::Investment),
            ("install this security patch", ScamCategory::TechSupport),
        ];

        for (text, expected) in cases {
            let explanation = explain(text).expect("category should match");
            assert_eq!(explanation.category, expected, "text: {text}");
            assert!(!explanation.message.trim().is_empty());
        }
    }

    #[test]
    fn earlier_rows_win_on_overlap() {
        // "wire transfer ... urgent" hits both money-transfer and urgency.
        let explanation = explain("urgent wire transfer needed").expect("match");
        assert_eq!(explanation.category, ScamCategory::MoneyTransfer);
    }

    #[test]
    fn no_match_is_none_not_default() {
        assert!(explain("see you at the park tomorrow").is_none());
    }

    #[test]
    fn matching_ignores_case() {
        assert!(explain("WIRE TRANSFER").is_some());
        assert_eq!(
            match_keyword("Your OTP is 1234", CallerContext::unknown_sender()),
            Some("otp")
        );
    }

    #[test]
    fn saved_contacts_use_reduced_vocabulary() {
        let saved = CallerContext::saved_contact();
        assert_eq!(match_keyword("send cash please", saved), None);
        assert_eq!(match_keyword("what is your cvv", saved), Some("cvv"));
        assert_eq!(
            match_keyword("send cash please", CallerContext::unknown_sender()),
            Some("cash")
        );
    }
}
