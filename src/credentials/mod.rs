use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use secrecy::SecretSlice;
use thiserror::Error;
use tracing::debug;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const HOME_MARKER: &str = "~";
const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

// -----------------------------------------------------------------------------
// ----- Certificate -----------------------------------------------------------

/// An X.509 certificate loaded from a PEM file.
#[derive(Clone, Debug)]
pub struct Certificate {
    pem: String,
    subject: String,
    public_key: Vec<u8>,
}

impl Certificate {
    /// The PEM text of the certificate block, as found on disk.
    pub fn pem(&self) -> &str {
        &self.pem
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Raw subject public key bits (an uncompressed EC point for P-256 certs).
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

// -----------------------------------------------------------------------------
// ----- Credentials: Exported -------------------------------------------------

/// Replace a leading `~` with the current user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, CredentialError> {
    let Some(rest) = path.strip_prefix(HOME_MARKER) else {
        return Ok(PathBuf::from(path));
    };

    // `~user/...` is not a home shorthand we resolve.
    if !rest.is_empty() && !rest.starts_with('/') {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir().ok_or(CredentialError::HomeDir)?;
    match rest.trim_start_matches('/') {
        "" => Ok(home),
        rest => Ok(home.join(rest)),
    }
}

pub fn load_certificate(path: &str) -> Result<Certificate, CredentialError> {
    let path = expand_home(path)?;
    let raw = fs::read_to_string(&path).map_err(|e| CredentialError::Io {
        path: path.clone(),
        source: e,
    })?;

    let mut reader = BufReader::new(raw.as_bytes());
    let der = rustls_pemfile::certs(&mut reader)
        .next()
        .ok_or_else(|| CredentialError::parse(&path, "no certificate found"))?
        .map_err(|e| CredentialError::parse(&path, e))?;

    let (subject, public_key) = match x509_parser::parse_x509_certificate(der.as_ref()) {
        Ok((_, cert)) => (
            cert.subject().to_string(),
            cert.public_key().subject_public_key.data.to_vec(),
        ),
        Err(e) => return Err(CredentialError::parse(&path, e)),
    };

    let pem = first_pem_block(&raw)
        .ok_or_else(|| CredentialError::parse(&path, "unterminated certificate block"))?
        .to_string();

    debug!("loaded certificate {} from {}", subject, path.display());

    Ok(Certificate {
        pem,
        subject,
        public_key,
    })
}

/// Read the lexicographically first regular file in `dir`.
pub fn load_first_key_in_directory(dir: &str) -> Result<SecretSlice<u8>, CredentialError> {
    let dir = expand_home(dir)?;
    let io_err = |source: std::io::Error| CredentialError::Io {
        path: dir.clone(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let first = files
        .into_iter()
        .next()
        .ok_or_else(|| CredentialError::EmptyDirectory { path: dir.clone() })?;

    let bytes = read_file(&first)?;
    debug!("loaded private key from {}", first.display());

    Ok(SecretSlice::from(bytes))
}

// -----------------------------------------------------------------------------
// ----- Credentials: Private helpers ------------------------------------------

fn read_file(path: &Path) -> Result<Vec<u8>, CredentialError> {
    fs::read(path).map_err(|e| CredentialError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn first_pem_block(raw: &str) -> Option<&str> {
    let start = raw.find(PEM_BEGIN)?;
    let end = raw[start..].find(PEM_END)? + start + PEM_END.len();
    Some(&raw[start..end])
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to resolve home directory")]
    HomeDir,

    #[error("read error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid certificate in {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("no key file found in {path:?}")]
    EmptyDirectory { path: PathBuf },
}

impl CredentialError {
    fn parse(path: &Path, reason: impl ToString) -> Self {
        CredentialError::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
