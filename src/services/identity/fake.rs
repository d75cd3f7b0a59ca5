//! Test doubles for the identity seam.

use std::collections::HashMap;

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, jwk::JwkSet};

use crate::services::identity::{
    DecodedIdentity, IdentityVerifier, KeySource, KeySourceError, RejectReason, VerifyError,
    keys::decoding_keys,
};

/// Fixed key set, parsed the same way as a fetched one.
pub struct StaticKeySource {
    keys: HashMap<String, DecodingKey>,
}

impl StaticKeySource {
    pub fn from_jwk_set_json(json: &str) -> Result<Self, KeySourceError> {
        let set: JwkSet = serde_json::from_str(json)
            .map_err(|e| KeySourceError::InvalidKeySet(e.to_string()))?;

        Ok(Self {
            keys: decoding_keys(&set)?,
        })
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn decoding_key(&self, kid: &str) -> Result<Option<DecodingKey>, KeySourceError> {
        Ok(self.keys.get(kid).cloned())
    }
}

/// Verifier with canned answers keyed by the raw token text.
///
/// - a token listed in `identities` verifies to that identity
/// - `fault_token` fails as if the key backend were down
/// - anything else is rejected
#[derive(Default)]
pub struct FakeVerifier {
    identities: HashMap<String, DecodedIdentity>,
    fault_token: Option<String>,
}

impl FakeVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: &str, subject_id: &str, email: Option<&str>) -> Self {
        self.identities.insert(
            token.to_string(),
            DecodedIdentity {
                subject_id: subject_id.to_string(),
                email: email.map(str::to_string),
            },
        );
        self
    }

    pub fn with_fault(mut self, token: &str) -> Self {
        self.fault_token = Some(token.to_string());
        self
    }
}

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<DecodedIdentity, VerifyError> {
        if self.fault_token.as_deref() == Some(token) {
            return Err(KeySourceError::InvalidKeySet("key backend unreachable".to_string()).into());
        }

        self.identities
            .get(token)
            .cloned()
            .ok_or_else(|| RejectReason::UnknownKid("fake".to_string()).into())
    }
}
