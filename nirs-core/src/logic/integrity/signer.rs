use sha2::{Digest, Sha256};

use crate::logic::error::CollaboratorError;

/// Produces an integrity signature for canonical record bytes.
/// Must be deterministic for a fixed input under one configuration.
pub trait Signer: Send + Sync {
    fn sign(&self, payload: &[u8]) -> Result<String, CollaboratorError>;
}

impl<F> Signer for F
where
    F: Fn(&[u8]) -> Result<String, CollaboratorError> + Send + Sync,
{
    fn sign(&self, payload: &[u8]) -> Result<String, CollaboratorError> {
        self(payload)
    }
}

/// Hex SHA-256 over `key || payload`
#[derive(Clone, Default)]
pub struct Sha256Signer {
    key: Option<Vec<u8>>,
}

impl Sha256Signer {
    pub fn new() -> Self {
        Self { key: None }
    }

    pub fn with_key(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: Some(key.as_ref().to_vec()),
        }
    }
}

impl std::fmt::Debug for Sha256Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Signer")
            .field("keyed", &self.key.is_some())
            .finish()
    }
}

impl Signer for Sha256Signer {
    fn sign(&self, payload: &[u8]) -> Result<String, CollaboratorError> {
        let mut hasher = Sha256::new();
        if let Some(key) = &self.key {
            hasher.update(key);
        }
        hasher.update(payload);
        Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
    }
}
