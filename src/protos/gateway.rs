use super::common::Envelope;
use super::peer::{Response, SignedProposal};

// -----------------------------------------------------------------------------
// ----- Service paths ---------------------------------------------------------

pub const ENDORSE_PATH: &str = "/gateway.Gateway/Endorse";
pub const SUBMIT_PATH: &str = "/gateway.Gateway/Submit";
pub const COMMIT_STATUS_PATH: &str = "/gateway.Gateway/CommitStatus";
pub const EVALUATE_PATH: &str = "/gateway.Gateway/Evaluate";

// -----------------------------------------------------------------------------
// ----- Endorse ---------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndorseRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    #[prost(message, optional, tag = "3")]
    pub proposed_transaction: Option<SignedProposal>,

    #[prost(string, repeated, tag = "4")]
    pub endorsing_organizations: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EndorseResponse {
    /// Unsigned transaction envelope ready to be signed and submitted.
    #[prost(message, optional, tag = "1")]
    pub prepared_transaction: Option<Envelope>,
}

// -----------------------------------------------------------------------------
// ----- Submit ----------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    #[prost(message, optional, tag = "3")]
    pub prepared_transaction: Option<Envelope>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubmitResponse {}

// -----------------------------------------------------------------------------
// ----- CommitStatus ----------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitStatusRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    /// Serialized `msp.SerializedIdentity` of the requesting client.
    #[prost(bytes = "vec", tag = "3")]
    pub identity: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedCommitStatusRequest {
    /// Serialized `CommitStatusRequest`.
    #[prost(bytes = "vec", tag = "1")]
    pub request: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitStatusResponse {
    /// `protos.TxValidationCode`
    #[prost(int32, tag = "1")]
    pub result: i32,

    #[prost(uint64, tag = "2")]
    pub block_number: u64,
}

// -----------------------------------------------------------------------------
// ----- Evaluate --------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EvaluateRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: String,

    #[prost(string, tag = "2")]
    pub channel_id: String,

    #[prost(message, optional, tag = "3")]
    pub proposed_transaction: Option<SignedProposal>,

    #[prost(string, repeated, tag = "4")]
    pub target_organizations: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EvaluateResponse {
    #[prost(message, optional, tag = "1")]
    pub result: Option<Response>,
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
