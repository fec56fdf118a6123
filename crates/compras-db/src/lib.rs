// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Read-only gateway to the purchase ledger of an Aspel-SAE company
//! database. Every public operation opens its own Firebird session,
//! verifies the ledger relation exists, runs its statements, and closes
//! the session on every exit path.

pub mod error;
mod firebird;
pub mod locate;
pub mod normalize;

use compras_app::{PurchaseRecord, PurchaseReport, SeriesStatistics};
use log::debug;
use std::path::PathBuf;

pub use error::GatewayError;
pub use firebird::open_session;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3050;
pub const DEFAULT_USER: &str = "SYSDBA";
pub const DEFAULT_PASSWORD: &str = "masterkey";
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// The purchase-ledger relation of the first company.
pub const PURCHASES_RELATION: &str = "COMPC01";

/// Counts catalog entries for a user relation; the name arrives trimmed
/// and uppercased as the single parameter.
pub const RELATION_EXISTS_SQL: &str = "\
SELECT COUNT(*)
FROM RDB$RELATIONS
WHERE (RDB$SYSTEM_FLAG IS NULL OR RDB$SYSTEM_FLAG = 0)
  AND UPPER(TRIM(RDB$RELATION_NAME)) = ?";

/// Pending rows: not cancelled and no linked tax document yet. Dates and
/// counts are cast to VARCHAR so every statement decodes through the same
/// text path regardless of the company file's dialect.
pub const PENDING_PURCHASES_SQL: &str = "\
SELECT CVE_DOC, SERIE, ESCFD,
       CAST(FECHA_DOC AS VARCHAR(24)) AS FECHA_DOC,
       CAST(FECHA_ELAB AS VARCHAR(24)) AS FECHA_ELAB
FROM COMPC01
WHERE (ESCFD IS NULL OR UPPER(TRIM(ESCFD)) <> 'S')
  AND (STATUS IS NULL OR UPPER(TRIM(STATUS)) <> 'C')
ORDER BY CVE_DOC";

/// Every non-cancelled row regardless of linkage state.
pub const SUMMARY_PURCHASES_SQL: &str = "\
SELECT CVE_DOC, SERIE, ESCFD,
       CAST(FECHA_DOC AS VARCHAR(24)) AS FECHA_DOC,
       CAST(FECHA_ELAB AS VARCHAR(24)) AS FECHA_ELAB
FROM COMPC01
WHERE (STATUS IS NULL OR UPPER(TRIM(STATUS)) <> 'C')
ORDER BY CVE_DOC";

/// Per-series linked/unlinked counts over the non-cancelled ledger.
pub const SERIES_STATISTICS_SQL: &str = "\
SELECT SERIE,
       CAST(SUM(CASE WHEN UPPER(TRIM(ESCFD)) = 'S' THEN 1 ELSE 0 END) AS VARCHAR(12)) AS CON_DOCUMENTO,
       CAST(SUM(CASE WHEN ESCFD IS NULL OR UPPER(TRIM(ESCFD)) <> 'S' THEN 1 ELSE 0 END) AS VARCHAR(12)) AS SIN_DOCUMENTO,
       CAST(COUNT(*) AS VARCHAR(12)) AS TOTAL
FROM COMPC01
WHERE (STATUS IS NULL OR UPPER(TRIM(STATUS)) <> 'C')
GROUP BY SERIE
ORDER BY SERIE";

const CATALOG_STATEMENT: &str = "relation catalog";
const PENDING_STATEMENT: &str = "pending purchases";
const SUMMARY_STATEMENT: &str = "purchase summary";
const SERIES_STATEMENT: &str = "series statistics";
const RELEASE_STATEMENT: &str = "session release";

/// Connection options for the company database. Built once at startup
/// from configuration and environment, then passed by reference into
/// every operation; nothing reads ambient state after construction.
///
/// `role`, `page_size`, and `case_sensitive_keys` mirror the engine's
/// full connect-option schema; the pure-Rust wire client consumes
/// host/port/path/user/password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub user: String,
    pub password: String,
    pub role: Option<String>,
    pub page_size: u32,
    pub case_sensitive_keys: bool,
}

impl GatewayConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            database_path,
            user: DEFAULT_USER.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
            role: None,
            page_size: DEFAULT_PAGE_SIZE,
            case_sensitive_keys: true,
        }
    }
}

/// What a session statement can fail with before the orchestrator labels
/// it with the statement name.
pub type SessionFailure = Box<dyn std::error::Error + Send + Sync>;

/// One open handle to the database engine, scoped to a single logical
/// operation. The row-returning shapes are fixed; there is no general
/// query surface.
pub trait SaeSession {
    fn query_count(&mut self, sql: &str, param: &str) -> Result<i64, SessionFailure>;
    fn query_purchases(&mut self, sql: &str) -> Result<Vec<RawPurchaseRow>, SessionFailure>;
    fn query_series(&mut self, sql: &str) -> Result<Vec<RawSeriesRow>, SessionFailure>;
    /// Releases engine-side resources. Safe to call again after a failed
    /// statement or a previous close.
    fn close(&mut self) -> Result<(), SessionFailure>;
}

/// A purchase row exactly as the engine returned it, before any
/// normalization. All fields come back as text (see the CASTs in the
/// statements above).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPurchaseRow {
    pub cve_doc: Option<String>,
    pub serie: Option<String>,
    pub escfd: Option<String>,
    pub fecha_doc: Option<String>,
    pub fecha_elab: Option<String>,
}

pub(crate) type PurchaseTuple = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

impl From<PurchaseTuple> for RawPurchaseRow {
    fn from((cve_doc, serie, escfd, fecha_doc, fecha_elab): PurchaseTuple) -> Self {
        Self {
            cve_doc,
            serie,
            escfd,
            fecha_doc,
            fecha_elab,
        }
    }
}

/// One group of the statistics statement, still raw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeriesRow {
    pub serie: Option<String>,
    pub con_documento: Option<String>,
    pub sin_documento: Option<String>,
    pub total: Option<String>,
}

pub(crate) type SeriesTuple = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

impl From<SeriesTuple> for RawSeriesRow {
    fn from((serie, con_documento, sin_documento, total): SeriesTuple) -> Self {
        Self {
            serie,
            con_documento,
            sin_documento,
            total,
        }
    }
}

/// True iff a non-system relation with this name exists in the engine
/// catalog. The name is compared trimmed and uppercased, matching how
/// Firebird stores unquoted identifiers.
pub fn relation_exists<S: SaeSession>(
    session: &mut S,
    relation: &str,
) -> Result<bool, GatewayError> {
    let normalized = relation.trim().to_uppercase();
    let count = session
        .query_count(RELATION_EXISTS_SQL, &normalized)
        .map_err(|error| GatewayError::query(CATALOG_STATEMENT, error))?;
    Ok(count > 0)
}

/// Opens a session, fetches the full purchase report, and closes the
/// session whatever happens.
pub fn fetch_purchases(config: &GatewayConfig) -> Result<PurchaseReport, GatewayError> {
    let mut session = open_session(config)?;
    run_fetch(&mut session)
}

/// Opens a session just to verify the ledger relation exists.
pub fn check_schema(config: &GatewayConfig) -> Result<bool, GatewayError> {
    let mut session = open_session(config)?;
    let outcome = relation_exists(&mut session, PURCHASES_RELATION);
    let closed = session.close();
    let found = outcome?;
    closed.map_err(|error| GatewayError::query(RELEASE_STATEMENT, error))?;
    Ok(found)
}

/// The engine-independent fetch body: schema check, three statements,
/// close on every path. A failed statement aborts the remaining ones and
/// the original error propagates after the session is released.
pub fn run_fetch<S: SaeSession>(session: &mut S) -> Result<PurchaseReport, GatewayError> {
    let outcome = fetch_with_session(session);
    let closed = session.close();
    let report = outcome?;
    closed.map_err(|error| GatewayError::query(RELEASE_STATEMENT, error))?;
    Ok(report)
}

fn fetch_with_session<S: SaeSession>(session: &mut S) -> Result<PurchaseReport, GatewayError> {
    if !relation_exists(session, PURCHASES_RELATION)? {
        return Err(GatewayError::SchemaMissing {
            relation: PURCHASES_RELATION.to_owned(),
        });
    }

    let records = query_purchases(session, PENDING_STATEMENT, PENDING_PURCHASES_SQL)?;
    let summary = query_purchases(session, SUMMARY_STATEMENT, SUMMARY_PURCHASES_SQL)?;
    let statistics = session
        .query_series(SERIES_STATISTICS_SQL)
        .map_err(|error| GatewayError::query(SERIES_STATEMENT, error))?
        .into_iter()
        .map(statistics_from_raw)
        .collect::<Vec<_>>();

    debug!(
        "fetched {} pending, {} summary, {} series rows",
        records.len(),
        summary.len(),
        statistics.len()
    );
    Ok(PurchaseReport {
        records,
        summary,
        statistics,
    })
}

fn query_purchases<S: SaeSession>(
    session: &mut S,
    statement: &'static str,
    sql: &str,
) -> Result<Vec<PurchaseRecord>, GatewayError> {
    let rows = session
        .query_purchases(sql)
        .map_err(|error| GatewayError::query(statement, error))?;
    Ok(rows.into_iter().map(purchase_from_raw).collect())
}

fn purchase_from_raw(raw: RawPurchaseRow) -> PurchaseRecord {
    PurchaseRecord {
        key: normalize::clean_text(raw.cve_doc.as_deref()),
        series: normalize::clean_text(raw.serie.as_deref()),
        has_linked_document: normalize::clean_text(raw.escfd.as_deref()),
        document_date: normalize::iso_date(raw.fecha_doc.as_deref()),
        preparation_date: normalize::iso_date(raw.fecha_elab.as_deref()),
    }
}

fn statistics_from_raw(raw: RawSeriesRow) -> SeriesStatistics {
    let with_document = normalize::parse_count(raw.con_documento.as_deref());
    let without_document = normalize::parse_count(raw.sin_documento.as_deref());
    let total = normalize::explicit_total(raw.total.as_deref())
        .unwrap_or(with_document + without_document);
    SeriesStatistics {
        series: normalize::clean_text(raw.serie.as_deref()),
        with_document,
        without_document,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GatewayConfig, RawPurchaseRow, RawSeriesRow, purchase_from_raw, statistics_from_raw,
    };
    use std::path::PathBuf;

    #[test]
    fn gateway_config_carries_the_engine_defaults() {
        let config = GatewayConfig::new(PathBuf::from("/srv/SAE70EMPRE01.FDB"));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3050);
        assert_eq!(config.user, "SYSDBA");
        assert_eq!(config.password, "masterkey");
        assert_eq!(config.page_size, 4096);
        assert!(config.case_sensitive_keys);
        assert_eq!(config.role, None);
    }

    #[test]
    fn purchase_rows_normalize_text_and_dates() {
        let record = purchase_from_raw(RawPurchaseRow {
            cve_doc: Some("  FA 00042  ".to_owned()),
            serie: Some("FA".to_owned()),
            escfd: None,
            fecha_doc: Some("2024-05-03".to_owned()),
            fecha_elab: Some("not a date".to_owned()),
        });
        assert_eq!(record.key, "FA 00042");
        assert_eq!(record.series, "FA");
        assert_eq!(record.has_linked_document, "");
        assert_eq!(record.document_date.as_deref(), Some("2024-05-03T00:00:00Z"));
        assert_eq!(record.preparation_date, None);
    }

    #[test]
    fn series_rows_compute_the_total_when_the_engine_omits_it() {
        let statistics = statistics_from_raw(RawSeriesRow {
            serie: Some("A".to_owned()),
            con_documento: Some("3".to_owned()),
            sin_documento: Some("2".to_owned()),
            total: None,
        });
        assert_eq!(statistics.series, "A");
        assert_eq!(statistics.with_document, 3);
        assert_eq!(statistics.without_document, 2);
        assert_eq!(statistics.total, 5);
        assert!(statistics.is_consistent());
    }

    #[test]
    fn series_rows_keep_an_engine_total_even_when_inconsistent() {
        let statistics = statistics_from_raw(RawSeriesRow {
            serie: Some("B".to_owned()),
            con_documento: Some("1".to_owned()),
            sin_documento: Some("1".to_owned()),
            total: Some("9".to_owned()),
        });
        assert_eq!(statistics.total, 9);
        assert!(!statistics.is_consistent());
    }

    #[test]
    fn series_rows_fall_back_to_the_sum_on_an_unparsable_total() {
        let statistics = statistics_from_raw(RawSeriesRow {
            serie: Some("C".to_owned()),
            con_documento: Some("4".to_owned()),
            sin_documento: Some("1".to_owned()),
            total: Some("oops".to_owned()),
        });
        assert_eq!(statistics.total, 5);
    }
}
