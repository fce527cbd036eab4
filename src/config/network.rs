use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::gateway::ConnectParams;

// -----------------------------------------------------------------------------
// ----- NetworkConfig ---------------------------------------------------------

/// Connection settings for one Fabric network, as read from a TOML file:
///
/// ```toml
/// [network]
/// channel_name = "mychannel"
/// contract_name = "mycontract"
/// msp_id = "Org1MSP"
/// cert_path = "~/msp/signcerts/cert.pem"
/// key_path = "~/msp/keystore/"
/// tls_cert_path = "~/tls/ca.crt"
/// peer_endpoint = "localhost:7051"
/// gateway_peer = "peer0.org1.example.com"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    pub channel_name: String,
    pub contract_name: String,
    pub msp_id: String,
    pub cert_path: String,
    pub key_path: String,
    pub tls_cert_path: String,
    pub peer_endpoint: String,
    #[serde(alias = "gateway_host")]
    pub gateway_peer: String,
}

// -----------------------------------------------------------------------------
// ----- NetworkConfig: Static -------------------------------------------------

impl NetworkConfig {
    pub fn from_file(path: &Path) -> Result<NetworkConfig, NetworkConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| NetworkConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<NetworkConfig, NetworkConfigError> {
        let doc: NetworkFile =
            toml::from_str(raw).map_err(|e| NetworkConfigError::Toml { source: e })?;

        validate(&doc.network)?;
        Ok(doc.network)
    }
}

// -----------------------------------------------------------------------------
// ----- NetworkConfig: Public -------------------------------------------------

impl NetworkConfig {
    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams {
            channel: self.channel_name.clone(),
            contract: self.contract_name.clone(),
            msp_id: self.msp_id.clone(),
            cert_path: self.cert_path.clone(),
            key_path: self.key_path.clone(),
            tls_cert_path: self.tls_cert_path.clone(),
            peer_endpoint: self.peer_endpoint.clone(),
            gateway_host: self.gateway_peer.clone(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: On-disk format ----------------------------------------------

#[derive(Debug, Deserialize)]
struct NetworkFile {
    network: NetworkConfig,
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn validate(cfg: &NetworkConfig) -> Result<(), NetworkConfigError> {
    let fields = [
        ("channel_name", &cfg.channel_name),
        ("contract_name", &cfg.contract_name),
        ("msp_id", &cfg.msp_id),
        ("cert_path", &cfg.cert_path),
        ("key_path", &cfg.key_path),
        ("tls_cert_path", &cfg.tls_cert_path),
        ("peer_endpoint", &cfg.peer_endpoint),
        ("gateway_peer", &cfg.gateway_peer),
    ];

    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(NetworkConfigError::InvalidField(name.into()));
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum NetworkConfigError {
    #[error("invalid or missing field '{0}'")]
    InvalidField(String),

    #[error("read error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error: {source}")]
    Toml { source: toml::de::Error },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
