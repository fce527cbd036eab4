mod support;

use std::collections::HashMap;
use std::convert::Infallible;
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use parking_lot::Mutex;
use prost::Message;
use tokio::runtime::Runtime;
use tonic::Status;
use tonic::body::BoxBody;
use tonic::codec::ProstCodec;
use tonic::codegen::{Body, BoxFuture, Context, Poll, Service, StdError, empty_body, http};
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::transport::{Identity as TlsIdentity, Server, ServerTlsConfig};

use ledger_bridge::credentials::load_certificate;
use ledger_bridge::gateway::{ConnectParams, ConnectionPool, FabricConnector};
use ledger_bridge::protos::common::Envelope;
use ledger_bridge::protos::gateway::{
    COMMIT_STATUS_PATH, CommitStatusRequest, CommitStatusResponse, ENDORSE_PATH,
    EVALUATE_PATH, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
    SUBMIT_PATH, SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use ledger_bridge::protos::msp::SerializedIdentity;
use ledger_bridge::protos::peer::{
    ChaincodeInvocationSpec, ChaincodeProposalPayload, Proposal, Response, SignedProposal,
    TX_VALIDATION_VALID,
};
use ledger_bridge::{Bridge, GatewayError, STATUS_FAILED, STATUS_OK};
use support::{fixture, reserve_port, wait_for_listen};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const HOST: &str = "peer0.example.com";
const BLOCK_NUMBER: u64 = 42;

/// `protos.TxValidationCode.MVCC_READ_CONFLICT`
const TX_MVCC_READ_CONFLICT: i32 = 11;

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[test]
fn submit_is_endorsed_signed_submitted_and_committed() {
    let peer = FakePeer::start();
    let pool = ConnectionPool::new(FabricConnector::new().unwrap());

    assert_eq!(pool.acquire(&peer.params()).unwrap(), 1);

    let commit = pool
        .gateway()
        .submit(HOST, "put", &[b"users", b"{\"id\":1}"])
        .unwrap();

    assert_eq!(commit.block_number, BLOCK_NUMBER);
    assert_eq!(commit.transaction_id.len(), 64);
    assert_eq!(peer.gateway.submitted(), vec![commit.transaction_id.clone()]);
    assert_eq!(
        peer.gateway.invocation(&commit.transaction_id),
        Some(vec![b"put".to_vec(), b"users".to_vec(), b"{\"id\":1}".to_vec()])
    );

    assert_eq!(pool.release(HOST).unwrap(), 0);
    assert!(pool.is_empty());
}

#[test]
fn commit_that_is_not_valid_fails_submit() {
    let peer = FakePeer::start();
    let pool = ConnectionPool::new(FabricConnector::new().unwrap());
    pool.acquire(&peer.params()).unwrap();

    let err = pool
        .gateway()
        .submit(HOST, "reject", &[b"users", b"{}"])
        .unwrap_err();

    assert!(matches!(err, GatewayError::Transaction(_)));
    assert!(
        err.to_string().contains("status code 11"),
        "unexpected error: {err}"
    );
    assert_eq!(pool.users(HOST), Some(1));
}

#[test]
fn evaluate_returns_chaincode_payload() {
    let peer = FakePeer::start();
    let pool = ConnectionPool::new(FabricConnector::new().unwrap());
    pool.acquire(&peer.params()).unwrap();

    let payload = pool
        .gateway()
        .evaluate(HOST, "get", &[b"users", b"{\"v\":1}"])
        .unwrap();

    assert_eq!(&payload[..], b"{\"v\":1}");
    assert!(peer.gateway.submitted().is_empty());
}

#[test]
fn chaincode_error_status_fails_evaluate() {
    let peer = FakePeer::start();
    let pool = ConnectionPool::new(FabricConnector::new().unwrap());
    pool.acquire(&peer.params()).unwrap();

    let err = pool
        .gateway()
        .evaluate(HOST, "broken", &[b"users", b"{}"])
        .unwrap_err();

    assert!(matches!(err, GatewayError::Transaction(_)));
    assert!(err.to_string().contains("status 500"), "unexpected error: {err}");
}

#[test]
fn bridge_init_write_read_close_against_peer() {
    let peer = FakePeer::start();
    let bridge = Bridge::new(FabricConnector::new().unwrap());

    assert_eq!(bridge.init(&peer.params()), STATUS_OK);
    assert_eq!(bridge.write("{\"id\":7}", "put", "users", HOST), STATUS_OK);
    assert_eq!(
        &bridge.read("{\"id\":7}", "get", "users", HOST).unwrap()[..],
        b"{\"id\":7}"
    );

    assert_eq!(bridge.close("mycontract", HOST), STATUS_OK);
    assert!(bridge.pool().is_empty());
    assert_eq!(bridge.close("mycontract", HOST), STATUS_FAILED);
}

// -----------------------------------------------------------------------------
// ----- FakePeer --------------------------------------------------------------

/// A TLS `gateway.Gateway` endpoint on localhost, serving as `peer0.example.com`.
struct FakePeer {
    // Dropping the runtime stops the server.
    _runtime: Runtime,
    port: u16,
    gateway: Arc<FakeGateway>,
}

impl FakePeer {
    fn start() -> Self {
        let port = reserve_port("127.0.0.1");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let gateway = Arc::new(FakeGateway::default());

        let identity = TlsIdentity::from_pem(
            fs::read(fixture("tls/server.crt")).unwrap(),
            fs::read(fixture("tls/server.key")).unwrap(),
        );
        let router = Server::builder()
            .tls_config(ServerTlsConfig::new().identity(identity))
            .expect("server tls config")
            .add_service(GatewayService {
                gateway: gateway.clone(),
            });

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.spawn(router.serve(addr));
        wait_for_listen("127.0.0.1", port);

        Self {
            _runtime: runtime,
            port,
            gateway,
        }
    }

    fn params(&self) -> ConnectParams {
        ConnectParams {
            channel: "mychannel".into(),
            contract: "mycontract".into(),
            msp_id: "Org1MSP".into(),
            cert_path: fixture("msp/signcerts/cert.pem"),
            key_path: fixture("msp/keystore"),
            tls_cert_path: fixture("tls/ca.crt"),
            peer_endpoint: format!("127.0.0.1:{}", self.port),
            gateway_host: HOST.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- FakeGateway -----------------------------------------------------------

/// Checks every client signature against the fixture certificate.
///
/// The chaincode function decides the outcome: `reject` commits with
/// MVCC_READ_CONFLICT, `broken` answers evaluate with status 500, anything
/// else succeeds and evaluate echoes the last argument.
struct FakeGateway {
    client_key: VerifyingKey,
    invocations: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    submitted: Mutex<Vec<String>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        let cert = load_certificate(&fixture("msp/signcerts/cert.pem")).unwrap();

        Self {
            client_key: VerifyingKey::from_sec1_bytes(cert.public_key()).unwrap(),
            invocations: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }
}

impl FakeGateway {
    fn submitted(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }

    fn invocation(&self, transaction_id: &str) -> Option<Vec<Vec<u8>>> {
        self.invocations.lock().get(transaction_id).cloned()
    }

    fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse, Status> {
        let args = self.verified_args(request.proposed_transaction)?;
        self.invocations
            .lock()
            .insert(request.transaction_id.clone(), args);

        // The prepared transaction is opaque to the client; carry the tx id.
        Ok(EndorseResponse {
            prepared_transaction: Some(Envelope {
                payload: request.transaction_id.into_bytes(),
                signature: Vec::new(),
            }),
        })
    }

    fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, Status> {
        let envelope = request
            .prepared_transaction
            .ok_or_else(|| Status::invalid_argument("missing prepared transaction"))?;

        if envelope.payload != request.transaction_id.as_bytes() {
            return Err(Status::invalid_argument("envelope is for another transaction"));
        }
        self.verify(&envelope.payload, &envelope.signature)?;

        self.submitted.lock().push(request.transaction_id);
        Ok(SubmitResponse {})
    }

    fn commit_status(
        &self,
        signed: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse, Status> {
        self.verify(&signed.request, &signed.signature)?;

        let request = CommitStatusRequest::decode(signed.request.as_slice())
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        let identity = SerializedIdentity::decode(request.identity.as_slice())
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        if identity.mspid != "Org1MSP" {
            return Err(Status::permission_denied("unknown msp"));
        }

        if !self.submitted.lock().contains(&request.transaction_id) {
            return Err(Status::not_found("transaction was never submitted"));
        }

        let function = self
            .invocation(&request.transaction_id)
            .and_then(|args| args.into_iter().next())
            .unwrap_or_default();
        let result = match function.as_slice() {
            b"reject" => TX_MVCC_READ_CONFLICT,
            _ => TX_VALIDATION_VALID,
        };

        Ok(CommitStatusResponse {
            result,
            block_number: BLOCK_NUMBER,
        })
    }

    fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, Status> {
        let args = self.verified_args(request.proposed_transaction)?;

        let response = match args.first().map(Vec::as_slice) {
            Some(b"broken") => Response {
                status: 500,
                message: "chaincode panicked".into(),
                payload: Vec::new(),
            },
            _ => Response {
                status: 200,
                message: String::new(),
                payload: args.last().cloned().unwrap_or_default(),
            },
        };

        Ok(EvaluateResponse {
            result: Some(response),
        })
    }

    fn verified_args(&self, proposal: Option<SignedProposal>) -> Result<Vec<Vec<u8>>, Status> {
        let proposal = proposal.ok_or_else(|| Status::invalid_argument("missing proposal"))?;
        self.verify(&proposal.proposal_bytes, &proposal.signature)?;

        let decode_err = |e: prost::DecodeError| Status::invalid_argument(e.to_string());
        let proposal = Proposal::decode(proposal.proposal_bytes.as_slice()).map_err(decode_err)?;
        let payload =
            ChaincodeProposalPayload::decode(proposal.payload.as_slice()).map_err(decode_err)?;
        let invocation =
            ChaincodeInvocationSpec::decode(payload.input.as_slice()).map_err(decode_err)?;

        invocation
            .chaincode_spec
            .and_then(|spec| spec.input)
            .map(|input| input.args)
            .ok_or_else(|| Status::invalid_argument("missing chaincode input"))
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), Status> {
        let signature = Signature::from_der(signature)
            .map_err(|_| Status::unauthenticated("malformed signature"))?;
        self.client_key
            .verify(message, &signature)
            .map_err(|_| Status::unauthenticated("bad signature"))
    }
}

// -----------------------------------------------------------------------------
// ----- GatewayService --------------------------------------------------------

#[derive(Clone)]
struct GatewayService {
    gateway: Arc<FakeGateway>,
}

impl NamedService for GatewayService {
    const NAME: &'static str = "gateway.Gateway";
}

impl<B> Service<http::Request<B>> for GatewayService
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        let gateway = self.gateway.clone();
        let path = request.uri().path().to_string();

        Box::pin(async move {
            let response = match path.as_str() {
                ENDORSE_PATH => unary(gateway, FakeGateway::endorse, request).await,
                SUBMIT_PATH => unary(gateway, FakeGateway::submit, request).await,
                COMMIT_STATUS_PATH => unary(gateway, FakeGateway::commit_status, request).await,
                EVALUATE_PATH => unary(gateway, FakeGateway::evaluate, request).await,
                _ => unimplemented(),
            };
            Ok(response)
        })
    }
}

struct Method<Req, Resp> {
    gateway: Arc<FakeGateway>,
    handler: fn(&FakeGateway, Req) -> Result<Resp, Status>,
}

impl<Req, Resp> UnaryService<Req> for Method<Req, Resp> {
    type Response = Resp;
    type Future = std::future::Ready<Result<tonic::Response<Resp>, Status>>;

    fn call(&mut self, request: tonic::Request<Req>) -> Self::Future {
        let result = (self.handler)(&self.gateway, request.into_inner());
        std::future::ready(result.map(tonic::Response::new))
    }
}

async fn unary<Req, Resp, B>(
    gateway: Arc<FakeGateway>,
    handler: fn(&FakeGateway, Req) -> Result<Resp, Status>,
    request: http::Request<B>,
) -> http::Response<BoxBody>
where
    Req: Message + Default + Send + 'static,
    Resp: Message + Send + 'static,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    let mut grpc = Grpc::new(ProstCodec::<Resp, Req>::default());
    grpc.unary(Method { gateway, handler }, request).await
}

fn unimplemented() -> http::Response<BoxBody> {
    let mut response = http::Response::new(empty_body());
    let headers = response.headers_mut();
    headers.insert("grpc-status", http::HeaderValue::from_static("12"));
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/grpc"),
    );
    response
}
