// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// `common.HeaderType.ENDORSER_TRANSACTION`
pub const HEADER_TYPE_ENDORSER_TRANSACTION: i32 = 3;

// -----------------------------------------------------------------------------
// ----- common.Envelope -------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Envelope {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

// -----------------------------------------------------------------------------
// ----- common.Header ---------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(bytes = "vec", tag = "1")]
    pub channel_header: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub signature_header: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelHeader {
    #[prost(int32, tag = "1")]
    pub r#type: i32,

    #[prost(int32, tag = "2")]
    pub version: i32,

    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<prost_types::Timestamp>,

    #[prost(string, tag = "4")]
    pub channel_id: String,

    #[prost(string, tag = "5")]
    pub tx_id: String,

    #[prost(uint64, tag = "6")]
    pub epoch: u64,

    #[prost(bytes = "vec", tag = "7")]
    pub extension: Vec<u8>,

    #[prost(bytes = "vec", tag = "8")]
    pub tls_cert_hash: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignatureHeader {
    /// Serialized `msp.SerializedIdentity` of the submitting client.
    #[prost(bytes = "vec", tag = "1")]
    pub creator: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub nonce: Vec<u8>,
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
