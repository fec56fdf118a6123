// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Test doubles shared by the gateway test suites: a scripted engine
//! session plus terse raw-row constructors.

use compras_db::{
    PENDING_PURCHASES_SQL, RawPurchaseRow, RawSeriesRow, SaeSession, SessionFailure,
};

/// An engine session that replays canned rows and records every
/// statement it was asked to run, in order. Configure it with the
/// builder methods, hand it to `run_fetch`, then assert on `executed`
/// and `is_closed`.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    relations: Vec<String>,
    pending: Vec<RawPurchaseRow>,
    summary: Vec<RawPurchaseRow>,
    series: Vec<RawSeriesRow>,
    fail_on: Option<String>,
    pub executed: Vec<String>,
    pub close_count: usize,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relations present in the fake catalog, as the engine would store
    /// them (trimmed, uppercase).
    pub fn with_relations(mut self, names: &[&str]) -> Self {
        self.relations = names.iter().map(|name| (*name).to_owned()).collect();
        self
    }

    pub fn with_pending(mut self, rows: Vec<RawPurchaseRow>) -> Self {
        self.pending = rows;
        self
    }

    pub fn with_summary(mut self, rows: Vec<RawPurchaseRow>) -> Self {
        self.summary = rows;
        self
    }

    pub fn with_series(mut self, rows: Vec<RawSeriesRow>) -> Self {
        self.series = rows;
        self
    }

    /// Makes exactly this statement fail with a scripted engine error.
    pub fn failing_on(mut self, sql: &str) -> Self {
        self.fail_on = Some(sql.to_owned());
        self
    }

    pub fn is_closed(&self) -> bool {
        self.close_count > 0
    }

    fn record(&mut self, sql: &str) -> Result<(), SessionFailure> {
        self.executed.push(sql.to_owned());
        if self.fail_on.as_deref() == Some(sql) {
            return Err(Box::new(std::io::Error::other("scripted engine failure")));
        }
        Ok(())
    }
}

impl SaeSession for ScriptedSession {
    fn query_count(&mut self, sql: &str, param: &str) -> Result<i64, SessionFailure> {
        self.record(sql)?;
        let count = self
            .relations
            .iter()
            .filter(|relation| relation.as_str() == param)
            .count();
        Ok(count as i64)
    }

    fn query_purchases(&mut self, sql: &str) -> Result<Vec<RawPurchaseRow>, SessionFailure> {
        self.record(sql)?;
        if sql == PENDING_PURCHASES_SQL {
            Ok(self.pending.clone())
        } else {
            Ok(self.summary.clone())
        }
    }

    fn query_series(&mut self, sql: &str) -> Result<Vec<RawSeriesRow>, SessionFailure> {
        self.record(sql)?;
        Ok(self.series.clone())
    }

    fn close(&mut self) -> Result<(), SessionFailure> {
        self.close_count += 1;
        Ok(())
    }
}

pub fn purchase_row(
    cve_doc: Option<&str>,
    serie: Option<&str>,
    escfd: Option<&str>,
    fecha_doc: Option<&str>,
    fecha_elab: Option<&str>,
) -> RawPurchaseRow {
    RawPurchaseRow {
        cve_doc: cve_doc.map(str::to_owned),
        serie: serie.map(str::to_owned),
        escfd: escfd.map(str::to_owned),
        fecha_doc: fecha_doc.map(str::to_owned),
        fecha_elab: fecha_elab.map(str::to_owned),
    }
}

pub fn series_row(
    serie: Option<&str>,
    con_documento: Option<&str>,
    sin_documento: Option<&str>,
    total: Option<&str>,
) -> RawSeriesRow {
    RawSeriesRow {
        serie: serie.map(str::to_owned),
        con_documento: con_documento.map(str::to_owned),
        sin_documento: sin_documento.map(str::to_owned),
        total: total.map(str::to_owned),
    }
}
