use bytes::Bytes;

use crate::credentials::Certificate;
use crate::errors::Result;
use crate::identity::{Identity, Signer};

// -----------------------------------------------------------------------------
// ----- Connector -------------------------------------------------------------

/// Creates the transport and gateway session backing a pool entry.
///
/// `ConnectionPool` calls `dial` then `open_session` while holding its write
/// lock, so implementations only run once per pool key at a time.
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;
    type Session: GatewaySession;

    /// Open a TLS transport to `peer_endpoint`, verifying the server as
    /// `server_name` against `tls_ca`.
    fn dial(
        &self,
        peer_endpoint: &str,
        server_name: &str,
        tls_ca: &Certificate,
    ) -> Result<Self::Transport>;

    fn open_session(
        &self,
        transport: &Self::Transport,
        identity: Identity,
        signer: Signer,
    ) -> Result<Self::Session>;
}

// -----------------------------------------------------------------------------
// ----- Transport -------------------------------------------------------------

pub trait Transport: Send + Sync + 'static {
    fn close(&self);
}

// -----------------------------------------------------------------------------
// ----- GatewaySession --------------------------------------------------------

pub trait GatewaySession: Send + Sync + 'static {
    /// Endorse, submit and wait for the commit of a transaction.
    fn submit(&self, channel: &str, contract: &str, function: &str, args: &[&[u8]])
    -> Result<Commit>;

    /// Run a read-only query on a single peer and return its payload.
    fn evaluate(
        &self,
        channel: &str,
        contract: &str,
        function: &str,
        args: &[&[u8]],
    ) -> Result<Bytes>;

    fn close(&self);
}

// -----------------------------------------------------------------------------
// ----- Commit ----------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub transaction_id: String,
    pub block_number: u64,
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
