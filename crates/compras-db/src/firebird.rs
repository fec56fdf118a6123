// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The one module that talks to the wire client. Everything above it
//! works in terms of [`SaeSession`].

use crate::{
    GatewayConfig, GatewayError, PurchaseTuple, RawPurchaseRow, RawSeriesRow, SaeSession,
    SeriesTuple, SessionFailure,
};
use log::debug;
use rsfbclient::prelude::*;
use rsfbclient::Connection;
use rsfbclient_core::FirebirdClient;

struct FirebirdSession<C>
where
    C: FirebirdClient,
{
    conn: Option<Connection<C>>,
}

/// Opens a session against the configured company database. The file
/// must exist before dialing; a missing file is a connection failure
/// with the offending path in the message.
pub fn open_session(config: &GatewayConfig) -> Result<impl SaeSession, GatewayError> {
    let printable = config.database_path.to_string_lossy().into_owned();
    if !config.database_path.is_file() {
        return Err(GatewayError::connection(
            printable,
            std::io::Error::new(std::io::ErrorKind::NotFound, "database file does not exist"),
        ));
    }

    let conn = rsfbclient::builder_pure_rust()
        .host(config.host.as_str())
        .port(config.port)
        .db_name(printable.as_str())
        .user(config.user.as_str())
        .pass(config.password.as_str())
        .connect()
        .map_err(|error| GatewayError::connection(printable.clone(), error))?;

    debug!("opened session on {}:{} for {printable}", config.host, config.port);
    Ok(FirebirdSession { conn: Some(conn) })
}

impl<C> FirebirdSession<C>
where
    C: FirebirdClient,
{
    fn conn(&mut self) -> Result<&mut Connection<C>, SessionFailure> {
        self.conn
            .as_mut()
            .ok_or_else(|| GatewayError::SessionClosed.into())
    }
}

impl<C> SaeSession for FirebirdSession<C>
where
    C: FirebirdClient,
{
    fn query_count(&mut self, sql: &str, param: &str) -> Result<i64, SessionFailure> {
        let rows: Vec<(i64,)> = self.conn()?.query(sql, (param.to_owned(),))?;
        Ok(rows.first().map_or(0, |row| row.0))
    }

    fn query_purchases(&mut self, sql: &str) -> Result<Vec<RawPurchaseRow>, SessionFailure> {
        let rows: Vec<PurchaseTuple> = self.conn()?.query(sql, ())?;
        Ok(rows.into_iter().map(RawPurchaseRow::from).collect())
    }

    fn query_series(&mut self, sql: &str) -> Result<Vec<RawSeriesRow>, SessionFailure> {
        let rows: Vec<SeriesTuple> = self.conn()?.query(sql, ())?;
        Ok(rows.into_iter().map(RawSeriesRow::from).collect())
    }

    fn close(&mut self) -> Result<(), SessionFailure> {
        if let Some(conn) = self.conn.take() {
            conn.close()?;
            debug!("session closed");
        }
        Ok(())
    }
}
