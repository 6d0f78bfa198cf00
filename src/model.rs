// src/model.rs
//! Core records: the promo taxonomy, verification outcome and the `Deal` itself.

use chrono::{DateTime, Utc};
use std::fmt;

/// Kind of free/open-access offer. The taxonomy is open: labels we do not
/// recognise (e.g. rows written by a newer build) survive as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PromoType {
    OpenSource,
    FreeTrial,
    HundredPercentOff,
    FreeLimitedTime,
    FreeCredits,
    Free,
    Other(String),
}

impl PromoType {
    pub fn label(&self) -> &str {
        match self {
            PromoType::OpenSource => "Open-Source",
            PromoType::FreeTrial => "Free Trial",
            PromoType::HundredPercentOff => "100% Off",
            PromoType::FreeLimitedTime => "Free (Limited Time)",
            PromoType::FreeCredits => "Free Credits",
            PromoType::Free => "Free",
            PromoType::Other(s) => s.as_str(),
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Open-Source" => PromoType::OpenSource,
            "Free Trial" => PromoType::FreeTrial,
            "100% Off" => PromoType::HundredPercentOff,
            "Free (Limited Time)" => PromoType::FreeLimitedTime,
            "Free Credits" => PromoType::FreeCredits,
            "Free" => PromoType::Free,
            other => PromoType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PromoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the landing-page check. Notes exist only for `Unverified`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Unverified { reason: String },
}

impl Verification {
    pub fn unverified(reason: impl Into<String>) -> Self {
        Verification::Unverified {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Verification::Verified => "Verified",
            Verification::Unverified { .. } => "Unverified",
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match self {
            Verification::Verified => None,
            Verification::Unverified { reason } => Some(reason.as_str()),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }

    /// Rebuild from the persisted (status, notes) column pair.
    pub fn from_parts(status: &str, notes: Option<String>) -> Self {
        if status.eq_ignore_ascii_case("verified") {
            Verification::Verified
        } else {
            Verification::Unverified {
                reason: notes.unwrap_or_default(),
            }
        }
    }
}

/// Natural identity of a deal: (app_name, promo_type, website_url).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DealKey {
    pub app_name: String,
    pub promo_type: PromoType,
    pub website_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub app_name: String,
    pub website_url: String,
    pub promo_type: PromoType,
    pub trial_length: Option<String>,
    pub requirements: Option<String>,
    pub promo_code: Option<String>,
    pub source_urls: Vec<String>,
    pub date_found: DateTime<Utc>,
    pub category: String,
    pub notes: String,
    pub verification: Verification,
}

impl Deal {
    pub fn key(&self) -> DealKey {
        DealKey {
            app_name: self.app_name.clone(),
            promo_type: self.promo_type.clone(),
            website_url: self.website_url.clone(),
        }
    }
}
