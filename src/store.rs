// src/store.rs
//! SQLite-backed deal store. Identity is enforced by the database itself
//! (unique index), so overlapping runs converge without application locks.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::{Deal, PromoType, Verification};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS deals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_name TEXT NOT NULL,
    website_url TEXT NOT NULL,
    promo_type TEXT NOT NULL,
    trial_length TEXT,
    requirements TEXT,
    promo_code TEXT,
    source_urls TEXT NOT NULL,
    date_found TEXT NOT NULL,
    category TEXT NOT NULL,
    notes TEXT NOT NULL,
    verification_status TEXT NOT NULL,
    verification_notes TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS deals_unique
    ON deals (app_name, promo_type, website_url);
";

const UPSERT: &str = "
INSERT INTO deals (
    app_name, website_url, promo_type, trial_length, requirements,
    promo_code, source_urls, date_found, category, notes,
    verification_status, verification_notes
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
ON CONFLICT (app_name, promo_type, website_url) DO UPDATE SET
    trial_length = excluded.trial_length,
    requirements = excluded.requirements,
    promo_code = excluded.promo_code,
    source_urls = excluded.source_urls,
    date_found = excluded.date_found,
    category = excluded.category,
    notes = excluded.notes,
    verification_status = excluded.verification_status,
    verification_notes = excluded.verification_notes
";

const SELECT_ALL: &str = "
SELECT app_name, website_url, promo_type, trial_length, requirements,
       promo_code, source_urls, date_found, category, notes,
       verification_status, verification_notes
FROM deals
ORDER BY date_found DESC, id ASC
";

// Concurrent scheduled runs may hit the same file; wait for the writer lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("creating database directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Anything other than the identity conflict, which is merged, means the
    /// data model and the schema disagree.
    #[error("constraint violation outside deal identity: {0}")]
    Constraint(String),
    #[error("unreadable row: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

fn classify_sqlite(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(f, msg) if f.code == ErrorCode::ConstraintViolation => {
            StoreError::Constraint(msg.clone().unwrap_or_else(|| f.to_string()))
        }
        _ => StoreError::Sqlite(e),
    }
}

pub fn encode_date(d: &DateTime<Utc>) -> String {
    // Fixed-width nanos keep lexical order chronological and round trips exact.
    d.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_date(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("date_found {s:?}: {e}")))
}

struct RawRow {
    app_name: String,
    website_url: String,
    promo_type: String,
    trial_length: Option<String>,
    requirements: Option<String>,
    promo_code: Option<String>,
    source_urls: String,
    date_found: String,
    category: String,
    notes: String,
    verification_status: String,
    verification_notes: Option<String>,
}

impl RawRow {
    fn into_deal(self) -> Result<Deal, StoreError> {
        Ok(Deal {
            source_urls: serde_json::from_str(&self.source_urls)?,
            date_found: decode_date(&self.date_found)?,
            promo_type: PromoType::from_label(&self.promo_type),
            verification: Verification::from_parts(
                &self.verification_status,
                self.verification_notes,
            ),
            app_name: self.app_name,
            website_url: self.website_url,
            trial_length: self.trial_length,
            requirements: self.requirements,
            promo_code: self.promo_code,
            category: self.category,
            notes: self.notes,
        })
    }
}

pub struct DealStore {
    conn: Connection,
}

impl DealStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert or merge every deal in one transaction. Returns how many deals
    /// were written (inserted or updated).
    pub fn upsert(&mut self, deals: &[Deal]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare_cached(UPSERT)?;
            for d in deals {
                let urls = serde_json::to_string(&d.source_urls)?;
                stmt.execute(params![
                    d.app_name,
                    d.website_url,
                    d.promo_type.label(),
                    d.trial_length,
                    d.requirements,
                    d.promo_code,
                    urls,
                    encode_date(&d.date_found),
                    d.category,
                    d.notes,
                    d.verification.status(),
                    d.verification.notes(),
                ])
                .map_err(classify_sqlite)?;
                written += 1;
            }
        }
        tx.commit()?;
        tracing::debug!(written, "deals upserted");
        Ok(written)
    }

    /// Every stored deal, newest `date_found` first.
    pub fn fetch_all(&self) -> Result<Vec<Deal>, StoreError> {
        let mut stmt = self.conn.prepare(SELECT_ALL)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    app_name: row.get(0)?,
                    website_url: row.get(1)?,
                    promo_type: row.get(2)?,
                    trial_length: row.get(3)?,
                    requirements: row.get(4)?,
                    promo_code: row.get(5)?,
                    source_urls: row.get(6)?,
                    date_found: row.get(7)?,
                    category: row.get(8)?,
                    notes: row.get(9)?,
                    verification_status: row.get(10)?,
                    verification_notes: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawRow::into_deal).collect()
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM deals", [], |r| r.get(0))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }

    /// Most recent `date_found`, if any deal is stored.
    pub fn last_found(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let raw: Option<String> =
            self.conn
                .query_row("SELECT MAX(date_found) FROM deals", [], |r| r.get(0))?;
        raw.as_deref().map(decode_date).transpose()
    }
}
