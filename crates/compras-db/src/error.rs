// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Everything the gateway can fail with.
///
/// Two conditions are deliberately not errors: falling back to the
/// default installation path is a `debug!` event (the connection attempt
/// surfaces the real failure), and a value the normalizer could not parse
/// is a `warn!` event that defaults rather than aborts the fetch.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Engine unreachable, credentials rejected, or the database file is
    /// missing at open time.
    #[error("cannot open company database {path}: {source}")]
    Connection { path: String, source: Source },

    /// The expected relation is absent from the company database. Raised
    /// before any business statement runs.
    #[error(
        "company database has no {relation} relation; point the gateway at an Aspel-SAE company file"
    )]
    SchemaMissing { relation: String },

    /// Any other engine-reported failure while running a statement.
    #[error("{statement} statement failed: {source}")]
    Query {
        statement: &'static str,
        source: Source,
    },

    /// A statement was issued on a session that was already closed.
    #[error("session is already closed")]
    SessionClosed,
}

impl GatewayError {
    pub fn connection(path: impl Into<String>, source: impl Into<Source>) -> Self {
        Self::Connection {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn query(statement: &'static str, source: impl Into<Source>) -> Self {
        Self::Query {
            statement,
            source: source.into(),
        }
    }

    pub fn is_schema_missing(&self) -> bool {
        matches!(self, Self::SchemaMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::GatewayError;

    #[test]
    fn schema_missing_message_names_the_relation() {
        let error = GatewayError::SchemaMissing {
            relation: "COMPC01".to_owned(),
        };
        assert!(error.is_schema_missing());
        assert!(error.to_string().contains("COMPC01"));
        assert!(error.to_string().contains("Aspel-SAE"));
    }

    #[test]
    fn query_error_names_the_failing_statement() {
        let error = GatewayError::query(
            "pending purchases",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection reset"),
        );
        let message = error.to_string();
        assert!(message.contains("pending purchases"));
        assert!(message.contains("connection reset"));
    }
}
