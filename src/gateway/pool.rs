use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::session::{Connector, GatewaySession, Transport};
use super::transaction::TransactionGateway;
use crate::credentials::{load_certificate, load_first_key_in_directory};
use crate::errors::{GatewayError, Result};
use crate::identity::{Identity, Signer};

// -----------------------------------------------------------------------------
// ----- ConnectParams ---------------------------------------------------------

/// Everything needed to open a gateway session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectParams {
    pub channel: String,
    pub contract: String,
    pub msp_id: String,
    pub cert_path: String,
    pub key_path: String,
    pub tls_cert_path: String,
    pub peer_endpoint: String,
    pub gateway_host: String,
}

impl ConnectParams {
    /// Sessions are shared per gateway host; Close/Write/Read only carry it.
    pub fn pool_key(&self) -> &str {
        &self.gateway_host
    }
}

// -----------------------------------------------------------------------------
// ----- SessionRecord ---------------------------------------------------------

struct SessionRecord<C: Connector> {
    transport: C::Transport,
    session: Arc<C::Session>,
    channel: String,
    contract: String,
    peer_endpoint: String,
    users: usize,
}

// -----------------------------------------------------------------------------
// ----- SessionHandle ---------------------------------------------------------

/// A session copied out of the pool for a single call.
///
/// Holding a handle does not hold the pool lock; a handle outliving the
/// entry's teardown keeps the session object alive until it is dropped.
pub struct SessionHandle<S> {
    session: Arc<S>,
    channel: String,
    contract: String,
}

impl<S: GatewaySession> SessionHandle<S> {
    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionPool --------------------------------------------------------

pub struct ConnectionPool<C: Connector> {
    connector: C,
    sessions: RwLock<HashMap<String, SessionRecord<C>>>,
}

// -----------------------------------------------------------------------------
// ----- ConnectionPool: Static ------------------------------------------------

impl<C: Connector> ConnectionPool<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionPool: Public ------------------------------------------------

impl<C: Connector> ConnectionPool<C> {
    /// Join the session for `params.pool_key()`, opening it if needed.
    /// Returns the number of users after joining.
    ///
    /// An existing entry is reused as-is: channel, contract and credentials
    /// in `params` only take effect when the entry is created.
    pub fn acquire(&self, params: &ConnectParams) -> Result<usize> {
        let key = params.pool_key();
        let mut sessions = self.sessions.write();

        if let Some(record) = sessions.get_mut(key) {
            if record.channel != params.channel
                || record.contract != params.contract
                || record.peer_endpoint != params.peer_endpoint
            {
                warn!(
                    "reusing session for {key} bound to channel={} contract={} peer={}; \
                     ignoring channel={} contract={} peer={}",
                    record.channel,
                    record.contract,
                    record.peer_endpoint,
                    params.channel,
                    params.contract,
                    params.peer_endpoint
                );
            }

            record.users += 1;
            debug!("session {key} joined, users={}", record.users);
            return Ok(record.users);
        }

        let record = self.open(params)?;
        info!(
            "session {key} opened: peer={} channel={} contract={}",
            record.peer_endpoint, record.channel, record.contract
        );
        sessions.insert(key.to_string(), record);

        Ok(1)
    }

    /// Leave the session for `key`, tearing it down when the last user leaves.
    /// Returns the number of users remaining.
    pub fn release(&self, key: &str) -> Result<usize> {
        let mut sessions = self.sessions.write();

        let record = sessions
            .get_mut(key)
            .ok_or_else(|| GatewayError::lookup(key))?;

        record.users -= 1;
        if record.users > 0 {
            debug!("session {key} left, users={}", record.users);
            return Ok(record.users);
        }

        if let Some(record) = sessions.remove(key) {
            record.session.close();
            record.transport.close();
            info!("session {key} closed");
        }

        Ok(0)
    }

    pub fn lookup(&self, key: &str) -> Result<SessionHandle<C::Session>> {
        let sessions = self.sessions.read();
        let record = sessions.get(key).ok_or_else(|| GatewayError::lookup(key))?;

        Ok(SessionHandle {
            session: record.session.clone(),
            channel: record.channel.clone(),
            contract: record.contract.clone(),
        })
    }

    pub fn gateway(&self) -> TransactionGateway<'_, C> {
        TransactionGateway::new(self)
    }

    pub fn users(&self, key: &str) -> Option<usize> {
        self.sessions.read().get(key).map(|record| record.users)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sessions.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionPool: Private -----------------------------------------------

impl<C: Connector> ConnectionPool<C> {
    fn open(&self, params: &ConnectParams) -> Result<SessionRecord<C>> {
        let tls_ca = load_certificate(&params.tls_cert_path)?;
        let transport =
            self.connector
                .dial(&params.peer_endpoint, &params.gateway_host, &tls_ca)?;

        let session = match self.open_session(params, &transport) {
            Ok(session) => session,
            Err(err) => {
                transport.close();
                return Err(err);
            }
        };

        Ok(SessionRecord {
            transport,
            session: Arc::new(session),
            channel: params.channel.clone(),
            contract: params.contract.clone(),
            peer_endpoint: params.peer_endpoint.clone(),
            users: 1,
        })
    }

    fn open_session(&self, params: &ConnectParams, transport: &C::Transport) -> Result<C::Session> {
        let certificate = load_certificate(&params.cert_path)?;
        let identity = Identity::new(&params.msp_id, certificate)?;

        let key = load_first_key_in_directory(&params.key_path)?;
        let signer = Signer::from_pem(&key)?;
        identity.check_signer(&signer)?;

        self.connector.open_session(transport, identity, signer)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
