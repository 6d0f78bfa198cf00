// src/classify.rs
//! Promo text classifier: ordered accept/reject gates followed by an ordered
//! promo-type rule list (first match wins).
//!
//! All phrase matching is plain substring matching on the lower-cased text.
//! Both lists are evaluated in the order they are declared in
//! [`Classifier::new`]; reordering them changes verdicts.

use regex::Regex;
use std::fmt;

use crate::model::PromoType;

/// Phrase lists the classifier is built from.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub ai_terms: Vec<String>,
    pub free_signals: Vec<String>,
    pub open_source_signals: Vec<String>,
    pub student_signals: Vec<String>,
    pub referral_signals: Vec<String>,
    pub first_time_signals: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            ai_terms: owned(&[
                "ai",
                "artificial intelligence",
                "llm",
                "machine learning",
                "generative",
                "chatgpt",
            ]),
            free_signals: owned(&[
                "free trial",
                "try free",
                "free for",
                "free forever",
                "free tier",
                "free plan",
                "100% off",
                "free credits",
                "limited time free",
                "free to use",
            ]),
            open_source_signals: owned(&["open source", "self-hosted", "self hosted", "selfhosted"]),
            student_signals: owned(&["student", "edu discount", "education discount"]),
            referral_signals: owned(&["refer", "referral", "invite friends"]),
            first_time_signals: owned(&["first-time", "new customer"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    NotAiRelated,
    StudentOnly,
    ReferralRequirement,
    PartialDiscount,
    NoFreeSignal,
    UnclassifiedPromo,
    FirstTimeOnly,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotAiRelated => "Not AI-related",
            RejectReason::StudentOnly => "Student-only offer",
            RejectReason::ReferralRequirement => "Referral requirement",
            RejectReason::PartialDiscount => "Non-100% discount detected",
            RejectReason::NoFreeSignal => "No free/open-source signal",
            RejectReason::UnclassifiedPromo => "Unable to classify promo type",
            RejectReason::FirstTimeOnly => "First-time only restriction",
        }
    }

    /// Short label for metrics.
    pub fn slug(&self) -> &'static str {
        match self {
            RejectReason::NotAiRelated => "not_ai",
            RejectReason::StudentOnly => "student_only",
            RejectReason::ReferralRequirement => "referral",
            RejectReason::PartialDiscount => "partial_discount",
            RejectReason::NoFreeSignal => "no_free_signal",
            RejectReason::UnclassifiedPromo => "unclassified",
            RejectReason::FirstTimeOnly => "first_time_only",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub promo_type: PromoType,
    pub trial_length: Option<String>,
    pub promo_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(Classification),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn allowed(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Verdict::Accepted(_) => "Accepted",
            Verdict::Rejected(r) => r.as_str(),
        }
    }

    pub fn promo_type(&self) -> Option<&PromoType> {
        match self {
            Verdict::Accepted(c) => Some(&c.promo_type),
            Verdict::Rejected(_) => None,
        }
    }

    pub fn trial_length(&self) -> Option<&str> {
        match self {
            Verdict::Accepted(c) => c.trial_length.as_deref(),
            Verdict::Rejected(_) => None,
        }
    }

    pub fn promo_code(&self) -> Option<&str> {
        match self {
            Verdict::Accepted(c) => c.promo_code.as_deref(),
            Verdict::Rejected(_) => None,
        }
    }
}

#[derive(Debug)]
enum Gate {
    /// Pass only if one of the phrases is present.
    RequireAny(Vec<String>),
    /// Pass only if none of the phrases is present.
    RejectAny(Vec<String>),
    /// Pass unless a 1-99% discount is advertised ("100% off" exempts the text).
    RejectPartialDiscount,
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    Nothing,
    TrialLength,
    PromoCode,
}

#[derive(Debug)]
struct PromoRule {
    phrases: Vec<String>,
    promo: PromoType,
    capture: Capture,
}

const PROMO_CODE_DENYLIST: &[&str] = &["PRICING", "SIGNUP", "ACCOUNT", "SUBSCRIBE"];

/// Compiled classifier. Cheap to share by reference; holds no mutable state.
#[derive(Debug)]
pub struct Classifier {
    gates: Vec<(Gate, RejectReason)>,
    promo_rules: Vec<PromoRule>,
    first_time_signals: Vec<String>,
    discount_re: Regex,
    save_re: Regex,
    trial_re: Regex,
    code_re: Regex,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Lexicon::default())
    }
}

impl Classifier {
    pub fn new(lex: Lexicon) -> Self {
        let mut free_or_open = lex.free_signals.clone();
        free_or_open.extend(lex.open_source_signals.iter().cloned());

        let gates = vec![
            (Gate::RequireAny(lex.ai_terms), RejectReason::NotAiRelated),
            (Gate::RejectAny(lex.student_signals), RejectReason::StudentOnly),
            (
                Gate::RejectAny(lex.referral_signals),
                RejectReason::ReferralRequirement,
            ),
            (Gate::RejectPartialDiscount, RejectReason::PartialDiscount),
            (Gate::RequireAny(free_or_open), RejectReason::NoFreeSignal),
        ];

        let rule = |phrases: &[&str], promo: PromoType, capture: Capture| PromoRule {
            phrases: owned(phrases),
            promo,
            capture,
        };
        let promo_rules = vec![
            PromoRule {
                phrases: lex.open_source_signals,
                promo: PromoType::OpenSource,
                capture: Capture::Nothing,
            },
            rule(
                &["free trial", "try free"],
                PromoType::FreeTrial,
                Capture::TrialLength,
            ),
            rule(&["100% off"], PromoType::HundredPercentOff, Capture::PromoCode),
            rule(
                &["limited time free"],
                PromoType::FreeLimitedTime,
                Capture::Nothing,
            ),
            rule(&["free credits"], PromoType::FreeCredits, Capture::Nothing),
            rule(
                &["free plan", "free tier", "free forever"],
                PromoType::Free,
                Capture::Nothing,
            ),
            rule(&["free to use"], PromoType::Free, Capture::Nothing),
        ];

        Self {
            gates,
            promo_rules,
            first_time_signals: lex.first_time_signals,
            discount_re: Regex::new(r"\b([1-9][0-9]?)%\s*(off|discount)\b").expect("discount regex"),
            save_re: Regex::new(r"\bsave\s+[1-9][0-9]?%").expect("save regex"),
            trial_re: Regex::new(r"\b(\d{1,2})\s*(day|week|month)s?\b").expect("trial regex"),
            code_re: Regex::new(r"\b[A-Z0-9]{6,16}\b").expect("promo code regex"),
        }
    }

    pub fn classify(&self, text: &str) -> Verdict {
        let lowered = text.to_lowercase();

        for (gate, reason) in &self.gates {
            if !self.passes(gate, &lowered) {
                return Verdict::Rejected(*reason);
            }
        }

        let Some(rule) = self
            .promo_rules
            .iter()
            .find(|r| contains_any(&lowered, &r.phrases))
        else {
            return Verdict::Rejected(RejectReason::UnclassifiedPromo);
        };

        if contains_any(&lowered, &self.first_time_signals)
            && !matches!(
                rule.promo,
                PromoType::FreeTrial | PromoType::HundredPercentOff
            )
        {
            return Verdict::Rejected(RejectReason::FirstTimeOnly);
        }

        let (trial_length, promo_code) = match rule.capture {
            Capture::Nothing => (None, None),
            Capture::TrialLength => (self.extract_trial_length(&lowered), None),
            Capture::PromoCode => (None, self.extract_promo_code(text)),
        };

        Verdict::Accepted(Classification {
            promo_type: rule.promo.clone(),
            trial_length,
            promo_code,
        })
    }

    /// First `<N> <day|week|month>[s]` in the text, rendered singular: "14 day".
    pub fn extract_trial_length(&self, text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        let caps = self.trial_re.captures(&lowered)?;
        Some(format!("{} {}", &caps[1], &caps[2]))
    }

    /// First upper-case alphanumeric token of 6..=16 chars that is not purely
    /// numeric and not a common page word. Heuristic only.
    /// Matches the text as written, not an upper-cased copy, so a code typed
    /// in lower case ("launch2024") is not picked up.
    pub fn extract_promo_code(&self, text: &str) -> Option<String> {
        self.code_re
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|code| {
                !code.chars().all(|c| c.is_ascii_digit()) && !PROMO_CODE_DENYLIST.contains(code)
            })
            .map(str::to_string)
    }

    fn passes(&self, gate: &Gate, lowered: &str) -> bool {
        match gate {
            Gate::RequireAny(terms) => contains_any(lowered, terms),
            Gate::RejectAny(terms) => !contains_any(lowered, terms),
            Gate::RejectPartialDiscount => !self.has_partial_discount(lowered),
        }
    }

    fn has_partial_discount(&self, lowered: &str) -> bool {
        if lowered.contains("100% off") {
            return false;
        }
        self.discount_re.is_match(lowered) || self.save_re.is_match(lowered)
    }
}

fn contains_any(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| text.contains(t.as_str()))
}
