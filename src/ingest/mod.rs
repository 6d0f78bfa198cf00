// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::{DiscoveryProvider, SourceItem};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

/// Snippets longer than this are cut; titles are left whole.
pub const SNIPPET_MAX_CHARS: usize = 280;

const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "discord.gg",
];

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "scan_items_discovered_total",
            "Source items kept after discovery hygiene."
        );
        describe_counter!(
            "discovery_items_dropped_total",
            "Source items dropped for empty title or unusable url."
        );
        describe_counter!(
            "discovery_provider_errors_total",
            "Provider fetch/parse errors."
        );
    });
}

/// Normalize text: decode entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str, max_chars: Option<usize>) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if let Some(cap) = max_chars {
        if out.chars().count() > cap {
            out = out.chars().take(cap).collect();
        }
    }

    out
}

/// Absolute http(s) url without fragment, or `None` for relative links and
/// social-network pages.
pub fn clean_url(raw: &str) -> Option<String> {
    let decoded = html_escape::decode_html_entities(raw.trim()).to_string();
    let mut parsed = url::Url::parse(&decoded).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    let social = SOCIAL_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")));
    if social {
        return None;
    }
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

/// Apply discovery hygiene to raw provider output.
/// Returns (kept, dropped_count).
pub fn sanitize_items(raw: Vec<SourceItem>) -> (Vec<SourceItem>, usize) {
    let mut dropped = 0usize;
    let mut kept = Vec::with_capacity(raw.len());
    for mut it in raw {
        it.title = normalize_text(&it.title, None);
        it.snippet = normalize_text(&it.snippet, Some(SNIPPET_MAX_CHARS));
        let Some(url) = clean_url(&it.url) else {
            dropped += 1;
            continue;
        };
        if it.title.is_empty() {
            dropped += 1;
            continue;
        }
        it.url = url;
        kept.push(it);
    }
    (kept, dropped)
}

/// Run every provider in order and collect what they found. A failing
/// provider contributes nothing; the remaining ones still run.
pub async fn discover_all(providers: &[Box<dyn DiscoveryProvider>]) -> Vec<SourceItem> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for p in providers {
        match p.discover().await {
            Ok(mut v) => {
                tracing::debug!(provider = p.name(), items = v.len(), "provider done");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("discovery_provider_errors_total").increment(1);
            }
        }
    }

    let (kept, dropped) = sanitize_items(raw);
    counter!("scan_items_discovered_total").increment(kept.len() as u64);
    counter!("discovery_items_dropped_total").increment(dropped as u64);
    kept
}
