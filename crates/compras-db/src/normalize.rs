// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Defensive coercion of raw engine values.
//!
//! Every helper substitutes a safe default instead of failing; the fetch
//! must complete even when a legacy row carries garbage. Anything that
//! had to be defaulted is logged at `warn!`.

use log::warn;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Null/absent becomes the empty string; everything else is trimmed.
/// CHAR columns come back space-padded.
pub fn clean_text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_owned()
}

/// Re-emits an engine date as an ISO-8601 instant, or `None` when the
/// value is absent, blank, or unparsable. Never fails.
pub fn iso_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let Some(instant) = parse_engine_datetime(raw) else {
        warn!("unparsable engine date {raw:?}; emitting null");
        return None;
    };

    match instant.format(&Rfc3339) {
        Ok(formatted) => Some(formatted),
        Err(error) => {
            warn!("cannot format {raw:?} as ISO-8601 ({error}); emitting null");
            None
        }
    }
}

/// Parses a defensively-typed count column. Absent, unparsable, or
/// negative values contribute 0 so per-series counts stay non-negative.
pub fn parse_count(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };
    let Some(value) = parse_engine_integer(raw) else {
        warn!("unparsable engine count {raw:?}; counting as 0");
        return 0;
    };
    if value < 0 {
        warn!("negative engine count {raw:?}; counting as 0");
        return 0;
    }
    value
}

/// The engine-supplied total, when present and parsable. An unparsable
/// total is reported and discarded so the caller falls back to the
/// computed component sum rather than zero.
pub fn explicit_total(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    match parse_engine_integer(raw) {
        Some(value) if value >= 0 => Some(value),
        Some(_) | None => {
            warn!("unusable engine total {raw:?}; using the computed sum");
            None
        }
    }
}

fn parse_engine_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    // Dialect-1 columns occasionally surface as "3.0000".
    trimmed.parse::<f64>().ok().and_then(|value| {
        if value.is_finite() {
            Some(value.trunc() as i64)
        } else {
            None
        }
    })
}

/// Firebird renders DATE as `2024-05-03` and TIMESTAMP as
/// `2024-05-03 14:30:00.0000` when cast to VARCHAR; T-separated and
/// offset-bearing forms show up in mirrored databases. Naive values are
/// assumed UTC.
fn parse_engine_datetime(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    if let Ok(value) = Date::parse(raw, &format_description!("[year]-[month]-[day]")) {
        return Some(PrimitiveDateTime::new(value, Time::MIDNIGHT).assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    ) {
        return Some(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ) {
        return Some(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    None
}
