// tests/classify_scenarios.rs
//
// Headline texts run through the default classifier.

use aisubscalp::classify::RejectReason;
use aisubscalp::{Classifier, PromoType, Verdict};

fn accepted(text: &str) -> (PromoType, Option<String>, Option<String>) {
    match Classifier::default().classify(text) {
        Verdict::Accepted(c) => (c.promo_type, c.trial_length, c.promo_code),
        Verdict::Rejected(r) => panic!("{text:?} rejected: {r}"),
    }
}

fn rejected(text: &str) -> RejectReason {
    match Classifier::default().classify(text) {
        Verdict::Rejected(r) => r,
        Verdict::Accepted(c) => panic!("{text:?} accepted as {:?}", c.promo_type),
    }
}

#[test]
fn free_trial_with_length() {
    let (promo, trial, code) = accepted("Amazing AI tool with a free trial for 14 days.");
    assert_eq!(promo, PromoType::FreeTrial);
    assert_eq!(trial.as_deref(), Some("14 day"));
    assert_eq!(code, None);
}

#[test]
fn partial_discount_is_rejected() {
    assert_eq!(
        rejected("AI platform save 50% today."),
        RejectReason::PartialDiscount
    );
    // even when a free signal is also present
    assert_eq!(
        rejected("AI writer: free trial plus 20% off annual plans"),
        RejectReason::PartialDiscount
    );
}

#[test]
fn full_discount_is_not_partial() {
    let (promo, _, code) = accepted("Generative video AI now 100% off with code VIDEOFREE24");
    assert_eq!(promo, PromoType::HundredPercentOff);
    assert_eq!(code.as_deref(), Some("VIDEOFREE24"));
}

#[test]
fn open_source_wins_over_other_signals() {
    let (promo, trial, code) = accepted("Open source AI image app you can self-host.");
    assert_eq!(promo, PromoType::OpenSource);
    assert_eq!(trial, None);
    assert_eq!(code, None);

    let (promo, trial, _) = accepted("Self-hosted LLM gateway, free trial of the cloud edition 30 days");
    assert_eq!(promo, PromoType::OpenSource);
    assert_eq!(trial, None);
}

#[test]
fn student_only_is_rejected_even_when_free() {
    assert_eq!(
        rejected("AI tutor free plan for every student"),
        RejectReason::StudentOnly
    );
}

#[test]
fn gates_run_in_order() {
    // not AI beats everything else
    assert_eq!(
        rejected("Spreadsheet app for students, save 30%"),
        RejectReason::NotAiRelated
    );
    assert_eq!(
        rejected("ChatGPT wrapper, invite friends to unlock"),
        RejectReason::ReferralRequirement
    );
    assert_eq!(
        rejected("New LLM benchmark results published"),
        RejectReason::NoFreeSignal
    );
}

#[test]
fn first_time_restriction_spares_trials_only() {
    assert_eq!(
        rejected("AI notes app free credits for new customer accounts"),
        RejectReason::FirstTimeOnly
    );
    let (promo, trial, _) = accepted("AI notes app: free trial 2 weeks, new customer only");
    assert_eq!(promo, PromoType::FreeTrial);
    assert_eq!(trial.as_deref(), Some("2 week"));
}

#[test]
fn verdict_accessors_agree() {
    let v = Classifier::default().classify("Machine learning API free tier available");
    assert!(v.allowed());
    assert_eq!(v.promo_type(), Some(&PromoType::Free));
    assert_eq!(v.trial_length(), None);

    let r = Classifier::default().classify("Recipe blog");
    assert!(!r.allowed());
    assert_eq!(r.reason(), "Not AI-related");
}
