use std::time::SystemTime;

use prost::Message;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::identity::{IdentityError, Signer};
use crate::protos::common::{
    ChannelHeader, HEADER_TYPE_ENDORSER_TRANSACTION, Header, SignatureHeader,
};
use crate::protos::peer::{
    ChaincodeHeaderExtension, ChaincodeId, ChaincodeInput, ChaincodeInvocationSpec,
    ChaincodeProposalPayload, ChaincodeSpec, Proposal, SignedProposal,
};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const NONCE_LEN: usize = 24;

// -----------------------------------------------------------------------------
// ----- SignedTransactionProposal ---------------------------------------------

/// A chaincode invocation proposal, signed by the client and ready to be
/// endorsed or evaluated.
#[derive(Clone, Debug)]
pub struct SignedTransactionProposal {
    pub transaction_id: String,
    pub channel_id: String,
    pub proposal: SignedProposal,
}

// -----------------------------------------------------------------------------
// ----- ProposalBuilder -------------------------------------------------------

pub struct ProposalBuilder<'a> {
    creator: &'a [u8],
    channel: &'a str,
    contract: &'a str,
    function: &'a str,
    args: &'a [&'a [u8]],
    nonce: Option<[u8; NONCE_LEN]>,
}

impl<'a> ProposalBuilder<'a> {
    pub fn new(
        creator: &'a [u8],
        channel: &'a str,
        contract: &'a str,
        function: &'a str,
        args: &'a [&'a [u8]],
    ) -> Self {
        Self {
            creator,
            channel,
            contract,
            function,
            args,
            nonce: None,
        }
    }

    /// Fix the nonce instead of drawing a random one.
    pub fn with_nonce(mut self, nonce: [u8; NONCE_LEN]) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn sign(self, signer: &Signer) -> Result<SignedTransactionProposal, IdentityError> {
        let nonce = self.nonce.unwrap_or_else(random_nonce);
        let transaction_id = transaction_id(&nonce, self.creator);
        let chaincode_id = ChaincodeId {
            name: self.contract.to_string(),
            ..Default::default()
        };

        let channel_header = ChannelHeader {
            r#type: HEADER_TYPE_ENDORSER_TRANSACTION,
            timestamp: Some(prost_types::Timestamp::from(SystemTime::now())),
            channel_id: self.channel.to_string(),
            tx_id: transaction_id.clone(),
            extension: ChaincodeHeaderExtension {
                chaincode_id: Some(chaincode_id.clone()),
            }
            .encode_to_vec(),
            ..Default::default()
        };

        let header = Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: SignatureHeader {
                creator: self.creator.to_vec(),
                nonce: nonce.to_vec(),
            }
            .encode_to_vec(),
        };

        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.function.as_bytes().to_vec());
        args.extend(self.args.iter().map(|arg| arg.to_vec()));

        let invocation = ChaincodeInvocationSpec {
            chaincode_spec: Some(ChaincodeSpec {
                chaincode_id: Some(chaincode_id),
                input: Some(ChaincodeInput {
                    args,
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };

        let proposal_bytes = Proposal {
            header: header.encode_to_vec(),
            payload: ChaincodeProposalPayload {
                input: invocation.encode_to_vec(),
            }
            .encode_to_vec(),
            ..Default::default()
        }
        .encode_to_vec();

        let signature = signer.sign_message(&proposal_bytes)?;

        Ok(SignedTransactionProposal {
            transaction_id,
            channel_id: self.channel.to_string(),
            proposal: SignedProposal {
                proposal_bytes,
                signature,
            },
        })
    }
}

// -----------------------------------------------------------------------------
// ----- Private helpers -------------------------------------------------------

/// Fabric transaction ids are `hex(sha256(nonce || creator))`.
fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}

fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
