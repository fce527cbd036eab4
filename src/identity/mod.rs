use std::fmt;
use std::io::BufReader;

use p256::SecretKey;
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use prost::Message;
use rustls_pki_types::PrivateKeyDer;
use secrecy::{ExposeSecret, SecretSlice};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::credentials::Certificate;
use crate::protos::msp::SerializedIdentity;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const DIGEST_LEN: usize = 32;

// -----------------------------------------------------------------------------
// ----- Identity --------------------------------------------------------------

/// A client identity: an MSP id bound to an X.509 certificate.
#[derive(Clone, Debug)]
pub struct Identity {
    msp_id: String,
    certificate: Certificate,
}

impl Identity {
    pub fn new(msp_id: &str, certificate: Certificate) -> Result<Self, IdentityError> {
        if msp_id.trim().is_empty() {
            return Err(IdentityError::EmptyMspId);
        }

        Ok(Self {
            msp_id: msp_id.to_string(),
            certificate,
        })
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn public_key(&self) -> &[u8] {
        self.certificate.public_key()
    }

    /// Fail unless `signer` holds the private half of this identity's
    /// certificate key.
    pub fn check_signer(&self, signer: &Signer) -> Result<(), IdentityError> {
        let point = signer.verifying_key().to_encoded_point(false);
        if point.as_bytes() != self.public_key() {
            return Err(IdentityError::KeyMismatch {
                subject: self.certificate.subject().to_string(),
            });
        }

        Ok(())
    }

    /// Protobuf encoded `msp.SerializedIdentity`, used as the transaction creator.
    pub fn serialize(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate.pem().as_bytes().to_vec(),
        }
        .encode_to_vec()
    }
}

// -----------------------------------------------------------------------------
// ----- Signer ----------------------------------------------------------------

/// ECDSA P-256 signer over SHA-256 message digests.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
}

// -----------------------------------------------------------------------------
// ----- Signer: Static --------------------------------------------------------

impl Signer {
    /// Accepts a PKCS#8 (`PRIVATE KEY`) or SEC1 (`EC PRIVATE KEY`) PEM document.
    pub fn from_pem(pem: &SecretSlice<u8>) -> Result<Self, IdentityError> {
        let mut reader = BufReader::new(pem.expose_secret());
        let der = rustls_pemfile::private_key(&mut reader)
            .map_err(|e| IdentityError::InvalidKey(e.to_string()))?
            .ok_or_else(|| IdentityError::InvalidKey("no private key found".into()))?;

        let key = match der {
            PrivateKeyDer::Pkcs8(der) => SigningKey::from_pkcs8_der(der.secret_pkcs8_der())
                .map_err(|e| IdentityError::InvalidKey(e.to_string()))?,
            PrivateKeyDer::Sec1(der) => SecretKey::from_sec1_der(der.secret_sec1_der())
                .map(SigningKey::from)
                .map_err(|e| IdentityError::InvalidKey(e.to_string()))?,
            _ => return Err(IdentityError::UnsupportedKey),
        };

        Ok(Self { key })
    }
}

// -----------------------------------------------------------------------------
// ----- Signer: Public --------------------------------------------------------

impl Signer {
    /// Sign a SHA-256 digest. Returns a DER encoded, low-S signature.
    pub fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, IdentityError> {
        if digest.len() != DIGEST_LEN {
            return Err(IdentityError::DigestLength(digest.len()));
        }

        let signature: Signature = self
            .key
            .sign_prehash(digest)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);

        Ok(signature.to_der().as_bytes().to_vec())
    }

    pub fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let digest = Sha256::digest(message);
        self.sign(&digest)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.key.verifying_key()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("msp id must not be empty")]
    EmptyMspId,

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("unsupported private key type; expected an EC P-256 key")]
    UnsupportedKey,

    #[error("private key does not match the certificate for {subject}")]
    KeyMismatch { subject: String },

    #[error("expected a 32 byte digest, got {0} bytes")]
    DigestLength(usize),

    #[error("signing failed: {0}")]
    Signing(String),
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
