// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// One purchase-ledger row after normalization.
///
/// `has_linked_document` preserves the engine's raw tri-state marker
/// (`S`, `N`, or empty) instead of collapsing it to a boolean; the UI
/// renders the distinction between "explicitly unlinked" and "never set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub key: String,
    pub series: String,
    pub has_linked_document: String,
    /// ISO-8601 instant, or `None` when the engine value was absent or
    /// unparsable.
    pub document_date: Option<String>,
    pub preparation_date: Option<String>,
}

/// Per-series linked/unlinked counts over the non-cancelled ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    pub series: String,
    pub with_document: i64,
    pub without_document: i64,
    pub total: i64,
}

impl SeriesStatistics {
    /// Counts agree with the total unless the engine supplied its own.
    pub fn is_consistent(&self) -> bool {
        self.total == self.with_document + self.without_document
    }
}

/// The full payload handed to the UI collaborator: pending rows, the
/// non-cancelled summary, and per-series statistics. Built fresh per
/// request and discarded after serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReport {
    pub records: Vec<PurchaseRecord>,
    pub summary: Vec<PurchaseRecord>,
    pub statistics: Vec<SeriesStatistics>,
}

impl PurchaseReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.summary.is_empty() && self.statistics.is_empty()
    }
}
