use bytes::Bytes;
use tracing::{error, info};

use crate::errors::{GatewayError, Result, STATUS_OK};
use crate::gateway::{ConnectParams, ConnectionPool, Connector};

// -----------------------------------------------------------------------------
// ----- Bridge ----------------------------------------------------------------

/// The four boundary operations over an owned connection pool.
///
/// Every operation returns a status code; the distinguishing error detail
/// only reaches the log.
pub struct Bridge<C: Connector> {
    pool: ConnectionPool<C>,
}

// -----------------------------------------------------------------------------
// ----- Bridge: Static --------------------------------------------------------

impl<C: Connector> Bridge<C> {
    pub fn new(connector: C) -> Self {
        Self {
            pool: ConnectionPool::new(connector),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Bridge: Public --------------------------------------------------------

impl<C: Connector> Bridge<C> {
    pub fn init(&self, params: &ConnectParams) -> i32 {
        info!("initializing client for {}", params.pool_key());

        status(
            "init",
            self.pool.acquire(params).map(|users| {
                info!("client for {} ready, users={users}", params.pool_key());
            }),
        )
    }

    /// `contract` is accepted for symmetry with `init`; the pool key alone
    /// selects the session.
    pub fn close(&self, contract: &str, gateway_host: &str) -> i32 {
        info!("closing client for {gateway_host} (contract {contract})");
        status("close", self.pool.release(gateway_host).map(|_| ()))
    }

    pub fn write(&self, payload: &str, function: &str, table: &str, gateway_host: &str) -> i32 {
        info!("write {function} on {table} via {gateway_host}");

        let args: [&[u8]; 2] = [table.as_bytes(), payload.as_bytes()];
        status(
            "write",
            self.pool
                .gateway()
                .submit(gateway_host, function, &args)
                .map(|_| ()),
        )
    }

    pub fn read(
        &self,
        payload: &str,
        function: &str,
        table: &str,
        gateway_host: &str,
    ) -> std::result::Result<Bytes, i32> {
        info!("read {function} on {table} via {gateway_host}");

        let args: [&[u8]; 2] = [table.as_bytes(), payload.as_bytes()];
        match self.pool.gateway().evaluate(gateway_host, function, &args) {
            Ok(value) => Ok(value),
            Err(err) => Err(failure("read", &err)),
        }
    }

    pub fn pool(&self) -> &ConnectionPool<C> {
        &self.pool
    }
}

// -----------------------------------------------------------------------------
// ----- Private helpers -------------------------------------------------------

fn status(op: &str, result: Result<()>) -> i32 {
    match result {
        Ok(()) => STATUS_OK,
        Err(err) => failure(op, &err),
    }
}

fn failure(op: &str, err: &GatewayError) -> i32 {
    error!("{op} failed ({} error): {err}", err.kind());
    err.status()
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
