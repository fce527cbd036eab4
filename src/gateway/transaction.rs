use bytes::Bytes;
use tracing::debug;

use super::pool::ConnectionPool;
use super::session::{Commit, Connector, GatewaySession};
use crate::errors::Result;

// -----------------------------------------------------------------------------
// ----- TransactionGateway ----------------------------------------------------

/// Runs transactions against the channel and contract a pool entry was
/// opened with.
///
/// The pool lock is only held for the lookup; the remote call runs on the
/// copied-out session handle.
pub struct TransactionGateway<'a, C: Connector> {
    pool: &'a ConnectionPool<C>,
}

impl<'a, C: Connector> TransactionGateway<'a, C> {
    pub fn new(pool: &'a ConnectionPool<C>) -> Self {
        Self { pool }
    }

    pub fn submit(&self, key: &str, function: &str, args: &[&[u8]]) -> Result<Commit> {
        let handle = self.pool.lookup(key)?;
        debug!(
            "submit {function} on {key}: channel={} contract={}",
            handle.channel(),
            handle.contract()
        );

        let commit = handle
            .session()
            .submit(handle.channel(), handle.contract(), function, args)?;

        debug!(
            "transaction {} committed in block {}",
            commit.transaction_id, commit.block_number
        );
        Ok(commit)
    }

    pub fn evaluate(&self, key: &str, function: &str, args: &[&[u8]]) -> Result<Bytes> {
        let handle = self.pool.lookup(key)?;
        debug!(
            "evaluate {function} on {key}: channel={} contract={}",
            handle.channel(),
            handle.contract()
        );

        let payload = handle
            .session()
            .evaluate(handle.channel(), handle.contract(), function, args)?;

        debug!("evaluate {function} returned {} bytes", payload.len());
        Ok(payload)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
