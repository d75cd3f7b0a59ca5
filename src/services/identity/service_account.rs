//! Firebase Admin service-account credential.
//!
//! Built once at startup. A credential that cannot be built is fatal: the
//! process must not start serving with a half-configured identity client.

use jsonwebtoken::EncodingKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceAccountError {
    #[error("empty service account field: {0}")]
    Empty(&'static str),
    #[error("invalid service account private key: {0}")]
    InvalidPrivateKey(#[source] jsonwebtoken::errors::Error),
}

/// Project identity of the Firebase Admin credential.
///
/// The private key is only parsed to prove it is usable; it is not retained.
#[derive(Clone)]
pub struct ServiceAccount {
    project_id: String,
    client_email: String,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish()
    }
}

impl ServiceAccount {
    /// `private_key_pem` must be an RSA private key in PEM form (PKCS#8 as issued
    /// by Google, or PKCS#1) with real newlines.
    pub fn new(
        project_id: &str,
        client_email: &str,
        private_key_pem: &str,
    ) -> Result<Self, ServiceAccountError> {
        if project_id.trim().is_empty() {
            return Err(ServiceAccountError::Empty("project_id"));
        }
        if client_email.trim().is_empty() {
            return Err(ServiceAccountError::Empty("client_email"));
        }

        EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(ServiceAccountError::InvalidPrivateKey)?;

        Ok(Self {
            project_id: project_id.trim().to_string(),
            client_email: client_email.trim().to_string(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}
