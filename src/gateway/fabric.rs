use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::uri::PathAndQuery;
use parking_lot::Mutex;
use prost::Message;
use tokio::runtime::{Builder, Runtime};
use tonic::codec::ProstCodec;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info};

use super::proposal::{ProposalBuilder, SignedTransactionProposal};
use super::session::{Commit, Connector, GatewaySession, Transport};
use crate::credentials::Certificate;
use crate::errors::{GatewayError, Result};
use crate::identity::{Identity, Signer};
use crate::protos::gateway::{
    COMMIT_STATUS_PATH, CommitStatusRequest, CommitStatusResponse, ENDORSE_PATH,
    EVALUATE_PATH, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
    SUBMIT_PATH, SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use crate::protos::peer::TX_VALIDATION_VALID;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const RUNTIME_THREAD_NAME: &str = "ledger-bridge-io";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Chaincode responses at or above this status are errors.
const ERROR_STATUS_THRESHOLD: i32 = 400;

// -----------------------------------------------------------------------------
// ----- FabricConnector -------------------------------------------------------

/// Dials Fabric Gateway peers over gRPC/TLS.
///
/// Owns the tokio runtime every transport and session created through it is
/// driven on; callers block on it from their own threads.
pub struct FabricConnector {
    runtime: Arc<Runtime>,
}

impl FabricConnector {
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name(RUNTIME_THREAD_NAME)
            .build()
            .map_err(|e| GatewayError::connection(format!("failed to start runtime: {e}")))?;

        Ok(Self {
            runtime: Arc::new(runtime),
        })
    }
}

impl Connector for FabricConnector {
    type Transport = FabricTransport;
    type Session = FabricSession;

    fn dial(
        &self,
        peer_endpoint: &str,
        server_name: &str,
        tls_ca: &Certificate,
    ) -> Result<FabricTransport> {
        let uri = if peer_endpoint.contains("://") {
            peer_endpoint.to_string()
        } else {
            format!("https://{peer_endpoint}")
        };

        let tls = ClientTlsConfig::new()
            .ca_certificate(tonic::transport::Certificate::from_pem(tls_ca.pem()))
            .domain_name(server_name);

        let endpoint = Endpoint::from_shared(uri)
            .and_then(|endpoint| endpoint.tls_config(tls))
            .map(|endpoint| endpoint.connect_timeout(CONNECT_TIMEOUT))
            .map_err(|e| {
                GatewayError::connection(format!(
                    "invalid endpoint {peer_endpoint}: {}",
                    error_chain(&e)
                ))
            })?;

        let channel = self.runtime.block_on(endpoint.connect()).map_err(|e| {
            GatewayError::connection(format!(
                "failed to connect to {peer_endpoint} as {server_name}: {}",
                error_chain(&e)
            ))
        })?;

        info!("connected to {peer_endpoint} (tls server name {server_name})");

        Ok(FabricTransport {
            channel: Mutex::new(Some(channel)),
        })
    }

    fn open_session(
        &self,
        transport: &FabricTransport,
        identity: Identity,
        signer: Signer,
    ) -> Result<FabricSession> {
        let channel = transport
            .channel()
            .ok_or_else(|| GatewayError::connection("transport already closed"))?;

        debug!(
            "gateway session for msp {} as {}",
            identity.msp_id(),
            identity.certificate().subject()
        );

        Ok(FabricSession {
            runtime: self.runtime.clone(),
            client: Mutex::new(Some(GatewayClient::new(channel))),
            creator: identity.serialize(),
            signer,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- FabricTransport -------------------------------------------------------

pub struct FabricTransport {
    channel: Mutex<Option<Channel>>,
}

impl FabricTransport {
    fn channel(&self) -> Option<Channel> {
        self.channel.lock().clone()
    }
}

impl Transport for FabricTransport {
    /// The HTTP/2 connection closes once the session's clone is dropped too.
    fn close(&self) {
        self.channel.lock().take();
    }
}

// -----------------------------------------------------------------------------
// ----- FabricSession ---------------------------------------------------------

pub struct FabricSession {
    runtime: Arc<Runtime>,
    client: Mutex<Option<GatewayClient>>,
    creator: Vec<u8>,
    signer: Signer,
}

impl FabricSession {
    fn client(&self) -> Result<GatewayClient> {
        self.client
            .lock()
            .clone()
            .ok_or_else(|| GatewayError::transaction("gateway session closed"))
    }

    fn propose(
        &self,
        channel: &str,
        contract: &str,
        function: &str,
        args: &[&[u8]],
    ) -> Result<SignedTransactionProposal> {
        let proposal =
            ProposalBuilder::new(&self.creator, channel, contract, function, args)
                .sign(&self.signer)?;
        Ok(proposal)
    }

    async fn endorse_submit_commit(
        &self,
        mut client: GatewayClient,
        proposal: SignedTransactionProposal,
    ) -> Result<Commit> {
        let SignedTransactionProposal {
            transaction_id,
            channel_id,
            proposal,
        } = proposal;

        let endorsed = client
            .endorse(EndorseRequest {
                transaction_id: transaction_id.clone(),
                channel_id: channel_id.clone(),
                proposed_transaction: Some(proposal),
                endorsing_organizations: Vec::new(),
            })
            .await?;

        let mut envelope = endorsed.prepared_transaction.ok_or_else(|| {
            GatewayError::transaction(format!(
                "endorsement of {transaction_id} returned no prepared transaction"
            ))
        })?;
        envelope.signature = self.signer.sign_message(&envelope.payload)?;

        client
            .submit(SubmitRequest {
                transaction_id: transaction_id.clone(),
                channel_id: channel_id.clone(),
                prepared_transaction: Some(envelope),
            })
            .await?;

        let request = CommitStatusRequest {
            transaction_id: transaction_id.clone(),
            channel_id,
            identity: self.creator.clone(),
        }
        .encode_to_vec();
        let signature = self.signer.sign_message(&request)?;

        let status = client
            .commit_status(SignedCommitStatusRequest { request, signature })
            .await?;

        if status.result != TX_VALIDATION_VALID {
            return Err(GatewayError::transaction(format!(
                "transaction {transaction_id} failed to commit with status code {}",
                status.result
            )));
        }

        Ok(Commit {
            transaction_id,
            block_number: status.block_number,
        })
    }
}

impl GatewaySession for FabricSession {
    fn submit(
        &self,
        channel: &str,
        contract: &str,
        function: &str,
        args: &[&[u8]],
    ) -> Result<Commit> {
        let client = self.client()?;
        let proposal = self.propose(channel, contract, function, args)?;

        self.runtime
            .block_on(self.endorse_submit_commit(client, proposal))
    }

    fn evaluate(
        &self,
        channel: &str,
        contract: &str,
        function: &str,
        args: &[&[u8]],
    ) -> Result<Bytes> {
        let mut client = self.client()?;
        let SignedTransactionProposal {
            transaction_id,
            channel_id,
            proposal,
        } = self.propose(channel, contract, function, args)?;

        let response = self.runtime.block_on(client.evaluate(EvaluateRequest {
            transaction_id: transaction_id.clone(),
            channel_id,
            proposed_transaction: Some(proposal),
            target_organizations: Vec::new(),
        }))?;

        let result = response.result.ok_or_else(|| {
            GatewayError::transaction(format!("evaluation of {transaction_id} returned no result"))
        })?;

        if result.status >= ERROR_STATUS_THRESHOLD {
            return Err(GatewayError::transaction(format!(
                "evaluation of {transaction_id} failed with status {}: {}",
                result.status, result.message
            )));
        }

        Ok(Bytes::from(result.payload))
    }

    fn close(&self) {
        self.client.lock().take();
    }
}

// -----------------------------------------------------------------------------
// ----- GatewayClient ---------------------------------------------------------

/// Unary client for the `gateway.Gateway` gRPC service.
#[derive(Clone)]
struct GatewayClient {
    inner: tonic::client::Grpc<Channel>,
}

impl GatewayClient {
    fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    async fn endorse(&mut self, request: EndorseRequest) -> Result<EndorseResponse> {
        self.unary(request, ENDORSE_PATH).await
    }

    async fn submit(&mut self, request: SubmitRequest) -> Result<SubmitResponse> {
        self.unary(request, SUBMIT_PATH).await
    }

    async fn commit_status(
        &mut self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse> {
        self.unary(request, COMMIT_STATUS_PATH).await
    }

    async fn evaluate(&mut self, request: EvaluateRequest) -> Result<EvaluateResponse> {
        self.unary(request, EVALUATE_PATH).await
    }

    async fn unary<Req, Resp>(&mut self, request: Req, path: &'static str) -> Result<Resp>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        self.inner.ready().await.map_err(|e| {
            GatewayError::transaction(format!("gateway not ready: {}", error_chain(&e)))
        })?;

        let codec = ProstCodec::<Req, Resp>::default();
        let response = self
            .inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(path),
                codec,
            )
            .await?;

        Ok(response.into_inner())
    }
}

// -----------------------------------------------------------------------------
// ----- Private helpers -------------------------------------------------------

/// tonic transport errors only say "transport error"; the cause is in the chain.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
