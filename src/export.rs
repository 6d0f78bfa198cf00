// src/export.rs
//! Flat, string-valued projection of deals and the JSON/CSV writers built on it.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

use crate::model::Deal;
use crate::store::encode_date;

/// Column order of every export.
pub const FLAT_FIELDS: [&str; 12] = [
    "app_name",
    "website_url",
    "promo_type",
    "trial_length",
    "requirements",
    "promo_code",
    "source_urls",
    "date_found",
    "category",
    "notes",
    "verification_status",
    "verification_notes",
];

/// `None` marks a field that does not apply (JSON `null`, empty CSV cell).
pub type FlatRecord = IndexMap<&'static str, Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

pub fn to_flat_record(d: &Deal) -> FlatRecord {
    let urls = serde_json::to_string(&d.source_urls).unwrap_or_else(|_| "[]".to_string());
    let values = [
        Some(d.app_name.clone()),
        Some(d.website_url.clone()),
        Some(d.promo_type.label().to_string()),
        d.trial_length.clone(),
        d.requirements.clone(),
        d.promo_code.clone(),
        Some(urls),
        Some(encode_date(&d.date_found)),
        Some(d.category.clone()),
        Some(d.notes.clone()),
        Some(d.verification.status().to_string()),
        d.verification.notes().map(str::to_string),
    ];
    FLAT_FIELDS.into_iter().zip(values).collect()
}

pub fn to_flat_records(deals: &[Deal]) -> Vec<FlatRecord> {
    deals.iter().map(to_flat_record).collect()
}

pub fn write_export(records: &[FlatRecord], path: &Path, format: ExportFormat) -> Result<()> {
    let body = match format {
        ExportFormat::Json => serde_json::to_string_pretty(records).context("encoding json")?,
        ExportFormat::Csv => render_csv(records),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating export dir {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("writing export {}", path.display()))?;
    tracing::info!(records = records.len(), path = %path.display(), ?format, "export written");
    Ok(())
}

/// RFC 4180 CSV with a header row; empty input renders as an empty file.
pub fn render_csv(records: &[FlatRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    push_row(&mut out, FLAT_FIELDS.iter().copied());
    for r in records {
        push_row(
            &mut out,
            FLAT_FIELDS
                .iter()
                .map(|k| r.get(k).and_then(|v| v.as_deref()).unwrap_or("")),
        );
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if cell.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}
