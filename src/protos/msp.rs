// -----------------------------------------------------------------------------
// ----- msp.SerializedIdentity ------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub mspid: String,

    /// PEM encoded X.509 certificate.
    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: Vec<u8>,
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
