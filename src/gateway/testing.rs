use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use bytes::Bytes;

use super::pool::ConnectParams;
use super::session::{Commit, Connector, GatewaySession, Transport};
use crate::credentials::Certificate;
use crate::errors::{GatewayError, Result};
use crate::identity::{Identity, Signer};

// -----------------------------------------------------------------------------
// ----- Fixtures --------------------------------------------------------------

pub fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

pub fn fixture_params(gateway_host: &str) -> ConnectParams {
    ConnectParams {
        channel: "mychannel".into(),
        contract: "mycontract".into(),
        msp_id: "Org1MSP".into(),
        cert_path: fixture("msp/signcerts/cert.pem"),
        key_path: fixture("msp/keystore"),
        tls_cert_path: fixture("tls/ca.crt"),
        peer_endpoint: "localhost:7051".into(),
        gateway_host: gateway_host.into(),
    }
}

// -----------------------------------------------------------------------------
// ----- RecordingConnector ----------------------------------------------------

#[derive(Debug, Default)]
struct Counters {
    dials: AtomicUsize,
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
    transports_closed: AtomicUsize,
    submits: AtomicU64,
}

/// Connector double that counts lifecycle events instead of dialing.
#[derive(Debug, Default)]
pub struct RecordingConnector {
    counters: Arc<Counters>,
    refuse: bool,
}

impl RecordingConnector {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }

    pub fn dials(&self) -> usize {
        self.counters.dials.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.counters.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.counters.sessions_closed.load(Ordering::SeqCst)
    }

    pub fn transports_closed(&self) -> usize {
        self.counters.transports_closed.load(Ordering::SeqCst)
    }
}

impl Connector for RecordingConnector {
    type Transport = RecordingTransport;
    type Session = RecordingSession;

    fn dial(&self, peer_endpoint: &str, _: &str, _: &Certificate) -> Result<RecordingTransport> {
        if self.refuse {
            return Err(GatewayError::connection(format!(
                "failed to connect to {peer_endpoint}: connection refused"
            )));
        }

        // Widen the window for racing acquires.
        thread::sleep(Duration::from_millis(5));
        self.counters.dials.fetch_add(1, Ordering::SeqCst);

        Ok(RecordingTransport {
            counters: self.counters.clone(),
        })
    }

    fn open_session(
        &self,
        _: &RecordingTransport,
        _: Identity,
        _: Signer,
    ) -> Result<RecordingSession> {
        self.counters.sessions_opened.fetch_add(1, Ordering::SeqCst);

        Ok(RecordingSession {
            counters: self.counters.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

#[derive(Debug)]
pub struct RecordingTransport {
    counters: Arc<Counters>,
}

impl Transport for RecordingTransport {
    fn close(&self) {
        self.counters.transports_closed.fetch_add(1, Ordering::SeqCst);
    }
}

// -----------------------------------------------------------------------------
// ----- RecordingSession ------------------------------------------------------

/// Echoes its call back: submit commits to an increasing block number and
/// evaluate returns `channel/contract/function(arg,arg)`.
#[derive(Debug)]
pub struct RecordingSession {
    counters: Arc<Counters>,
    closed: AtomicBool,
}

impl RecordingSession {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl GatewaySession for RecordingSession {
    fn submit(&self, channel: &str, contract: &str, function: &str, args: &[&[u8]]) -> Result<Commit> {
        if function == "fail" {
            return Err(GatewayError::transaction("endorsement rejected"));
        }

        let block_number = self.counters.submits.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Commit {
            transaction_id: echo(channel, contract, function, args),
            block_number,
        })
    }

    fn evaluate(
        &self,
        channel: &str,
        contract: &str,
        function: &str,
        args: &[&[u8]],
    ) -> Result<Bytes> {
        if function == "fail" {
            return Err(GatewayError::transaction("chaincode returned status 500"));
        }

        Ok(Bytes::from(echo(channel, contract, function, args)))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.counters.sessions_closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn echo(channel: &str, contract: &str, function: &str, args: &[&[u8]]) -> String {
    let args: Vec<String> = args
        .iter()
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect();
    format!("{channel}/{contract}/{function}({})", args.join(","))
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
