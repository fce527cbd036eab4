// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// `protos.TxValidationCode.VALID`
pub const TX_VALIDATION_VALID: i32 = 0;

// -----------------------------------------------------------------------------
// ----- Proposal --------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedProposal {
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_bytes: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Proposal {
    /// Serialized `common.Header`.
    #[prost(bytes = "vec", tag = "1")]
    pub header: Vec<u8>,

    /// Serialized `ChaincodeProposalPayload`.
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,

    #[prost(bytes = "vec", tag = "3")]
    pub extension: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeProposalPayload {
    /// Serialized `ChaincodeInvocationSpec`.
    #[prost(bytes = "vec", tag = "1")]
    pub input: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeHeaderExtension {
    #[prost(message, optional, tag = "2")]
    pub chaincode_id: Option<ChaincodeId>,
}

// -----------------------------------------------------------------------------
// ----- Chaincode -------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeInvocationSpec {
    #[prost(message, optional, tag = "1")]
    pub chaincode_spec: Option<ChaincodeSpec>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeSpec {
    #[prost(int32, tag = "1")]
    pub r#type: i32,

    #[prost(message, optional, tag = "2")]
    pub chaincode_id: Option<ChaincodeId>,

    #[prost(message, optional, tag = "3")]
    pub input: Option<ChaincodeInput>,

    #[prost(int32, tag = "4")]
    pub timeout: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeId {
    #[prost(string, tag = "1")]
    pub path: String,

    #[prost(string, tag = "2")]
    pub name: String,

    #[prost(string, tag = "3")]
    pub version: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeInput {
    /// Function name followed by its arguments.
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub args: Vec<Vec<u8>>,

    #[prost(bool, tag = "3")]
    pub is_init: bool,
}

// -----------------------------------------------------------------------------
// ----- Response --------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(int32, tag = "1")]
    pub status: i32,

    #[prost(string, tag = "2")]
    pub message: String,

    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
