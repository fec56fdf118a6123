// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use compras_db::{
    GatewayError, PENDING_PURCHASES_SQL, PURCHASES_RELATION, RELATION_EXISTS_SQL,
    SERIES_STATISTICS_SQL, SUMMARY_PURCHASES_SQL, relation_exists, run_fetch,
};
use compras_testkit::{ScriptedSession, purchase_row, series_row};

fn stocked_session() -> ScriptedSession {
    ScriptedSession::new()
        .with_relations(&[PURCHASES_RELATION])
        .with_pending(vec![
            purchase_row(
                Some("  FA 00042  "),
                Some("FA "),
                None,
                Some("2024-05-03"),
                Some("2024-05-01 09:30:00.0000"),
            ),
            purchase_row(Some("FA 00043"), Some("FA"), Some("N"), None, Some("banana")),
        ])
        .with_summary(vec![purchase_row(
            Some("FA 00042"),
            Some("FA"),
            Some("S"),
            Some("2024-05-03"),
            None,
        )])
        .with_series(vec![
            series_row(Some("A"), Some("3"), Some("2"), None),
            series_row(Some("B"), Some("1"), Some("1"), Some("9")),
        ])
}

#[test]
fn run_fetch_normalizes_every_row_shape() {
    let mut session = stocked_session();
    let report = run_fetch(&mut session).expect("fetch should succeed");

    assert_eq!(report.records.len(), 2);
    let first = &report.records[0];
    assert_eq!(first.key, "FA 00042");
    assert_eq!(first.series, "FA");
    assert_eq!(first.has_linked_document, "");
    assert_eq!(first.document_date.as_deref(), Some("2024-05-03T00:00:00Z"));
    assert_eq!(
        first.preparation_date.as_deref(),
        Some("2024-05-01T09:30:00Z")
    );

    // Garbage dates default to null instead of failing the fetch.
    let second = &report.records[1];
    assert_eq!(second.has_linked_document, "N");
    assert_eq!(second.document_date, None);
    assert_eq!(second.preparation_date, None);

    assert_eq!(report.summary.len(), 1);
    assert_eq!(report.summary[0].has_linked_document, "S");

    assert_eq!(report.statistics.len(), 2);
    assert_eq!(report.statistics[0].total, 5);
    assert_eq!(report.statistics[1].total, 9);
    assert!(session.is_closed());
}

#[test]
fn run_fetch_issues_the_statements_in_order() {
    let mut session = stocked_session();
    run_fetch(&mut session).expect("fetch should succeed");

    assert_eq!(
        session.executed,
        vec![
            RELATION_EXISTS_SQL.to_owned(),
            PENDING_PURCHASES_SQL.to_owned(),
            SUMMARY_PURCHASES_SQL.to_owned(),
            SERIES_STATISTICS_SQL.to_owned(),
        ]
    );
}

#[test]
fn missing_relation_fails_fast_without_business_queries() {
    let mut session = ScriptedSession::new().with_relations(&["FACTF01"]);
    let error = run_fetch(&mut session).expect_err("missing relation should fail");

    assert!(error.is_schema_missing());
    assert!(error.to_string().contains(PURCHASES_RELATION));
    assert_eq!(session.executed, vec![RELATION_EXISTS_SQL.to_owned()]);
    assert!(session.is_closed(), "session must be released on failure");
}

#[test]
fn relation_lookup_is_trimmed_and_case_insensitive() {
    let mut session = ScriptedSession::new().with_relations(&["COMPC01"]);
    assert!(relation_exists(&mut session, "compc01").expect("lookup"));
    assert!(relation_exists(&mut session, "  Compc01  ").expect("lookup"));
    assert!(!relation_exists(&mut session, "compc02").expect("lookup"));
}

#[test]
fn a_failing_statement_aborts_the_remaining_ones() {
    let mut session = stocked_session().failing_on(SUMMARY_PURCHASES_SQL);
    let error = run_fetch(&mut session).expect_err("scripted failure should propagate");

    match &error {
        GatewayError::Query { statement, .. } => assert_eq!(*statement, "purchase summary"),
        other => panic!("expected a query error, got {other:?}"),
    }
    assert_eq!(
        session.executed,
        vec![
            RELATION_EXISTS_SQL.to_owned(),
            PENDING_PURCHASES_SQL.to_owned(),
            SUMMARY_PURCHASES_SQL.to_owned(),
        ],
        "series statistics must not run after a failure"
    );
    assert!(session.is_closed(), "session must be released on failure");
}

#[test]
fn a_failing_catalog_lookup_surfaces_as_a_query_error() {
    let mut session = stocked_session().failing_on(RELATION_EXISTS_SQL);
    let error = run_fetch(&mut session).expect_err("catalog failure should propagate");

    assert!(matches!(error, GatewayError::Query { .. }));
    assert!(error.to_string().contains("relation catalog"));
    assert!(session.is_closed());
}

#[test]
fn statement_text_pins_the_ledger_semantics() {
    for sql in [PENDING_PURCHASES_SQL, SUMMARY_PURCHASES_SQL] {
        assert!(sql.contains("UPPER(TRIM(STATUS)) <> 'C'"), "{sql}");
        assert!(sql.contains("STATUS IS NULL"), "{sql}");
        assert!(sql.contains("ORDER BY CVE_DOC"), "{sql}");
    }
    assert!(PENDING_PURCHASES_SQL.contains("ESCFD IS NULL"));
    assert!(!SUMMARY_PURCHASES_SQL.contains("ESCFD IS NULL"));

    assert!(SERIES_STATISTICS_SQL.contains("GROUP BY SERIE"));
    assert!(SERIES_STATISTICS_SQL.contains("UPPER(TRIM(ESCFD)) = 'S'"));

    assert!(RELATION_EXISTS_SQL.contains("RDB$RELATIONS"));
    assert!(RELATION_EXISTS_SQL.contains("RDB$SYSTEM_FLAG"));
    assert!(RELATION_EXISTS_SQL.contains('?'));
}
