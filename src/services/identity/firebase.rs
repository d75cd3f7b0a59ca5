use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;

use crate::services::identity::{
    DecodedIdentity, IdentityVerifier, KeySource, RejectReason, ServiceAccount, VerifyError,
};

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
// Firebase uids are at most 128 characters.
const MAX_SUBJECT_LEN: usize = 128;
/// Upper bound for clock-skew leeway. jsonwebtoken subtracts it from the
/// current unix time in u64, so it must stay far below that.
pub const MAX_LEEWAY_SECONDS: u64 = 300;

/// Firebase ID token claims we care about.
///
/// `iss` / `aud` / `exp` are checked by `jsonwebtoken::Validation`.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    iat: i64,
    #[serde(default)]
    auth_time: Option<i64>,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies Firebase ID tokens (RS256, signed by Google's securetoken keys).
pub struct FirebaseVerifier {
    keys: Arc<dyn KeySource>,
    validation: Validation,
    leeway_seconds: i64,
}

impl std::fmt::Debug for FirebaseVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl FirebaseVerifier {
    /// `leeway_seconds` above `MAX_LEEWAY_SECONDS` is clamped.
    pub fn new(account: &ServiceAccount, keys: Arc<dyn KeySource>, leeway_seconds: u64) -> Self {
        let project_id = account.project_id();
        let leeway_seconds = leeway_seconds.min(MAX_LEEWAY_SECONDS);

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{project_id}")]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            keys,
            validation,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or_default(),
        }
    }

    fn check_claims(&self, claims: &IdTokenClaims, now: i64) -> Result<(), RejectReason> {
        let sub = claims.sub.trim();
        if sub.is_empty() {
            return Err(RejectReason::MissingClaim("sub"));
        }
        if sub.chars().count() > MAX_SUBJECT_LEN {
            return Err(RejectReason::InvalidClaim("sub"));
        }

        let latest = now.saturating_add(self.leeway_seconds);

        // issued in the future
        if claims.iat > latest {
            return Err(RejectReason::InvalidClaim("iat"));
        }

        let auth_time = claims
            .auth_time
            .ok_or(RejectReason::MissingClaim("auth_time"))?;
        if auth_time > latest {
            return Err(RejectReason::InvalidClaim("auth_time"));
        }

        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<DecodedIdentity, VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(RejectReason::from)?;

        if header.alg != Algorithm::RS256 {
            return Err(RejectReason::UnsupportedAlg(header.alg).into());
        }

        let kid = header.kid.ok_or(RejectReason::MissingKid)?;

        // A key-source failure is not the caller's fault; keep it distinct.
        let key = self
            .keys
            .decoding_key(&kid)
            .await?
            .ok_or_else(|| RejectReason::UnknownKid(kid.clone()))?;

        let data = jsonwebtoken::decode::<IdTokenClaims>(token, &key, &self.validation)
            .map_err(RejectReason::from)?;

        self.check_claims(&data.claims, chrono::Utc::now().timestamp())?;

        let IdTokenClaims { sub, email, .. } = data.claims;

        Ok(DecodedIdentity {
            subject_id: sub.trim().to_string(),
            email: email.filter(|e| !e.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{Value, json};

    use super::*;
    use crate::services::identity::KeySourceError;
    use crate::services::identity::fake::StaticKeySource;

    const KEY_PEM: &str = include_str!("testdata/service_account_key.pem");
    const JWKS: &str = include_str!("testdata/jwks.json");
    const PROJECT: &str = "receiving-dock";

    fn verifier_with(keys: Arc<dyn KeySource>) -> Result<FirebaseVerifier> {
        let account = ServiceAccount::new(PROJECT, "admin@receiving-dock.test", KEY_PEM)?;
        Ok(FirebaseVerifier::new(&account, keys, 60))
    }

    fn verifier() -> Result<FirebaseVerifier> {
        verifier_with(Arc::new(StaticKeySource::from_jwk_set_json(JWKS)?))
    }

    fn claims(sub: &str) -> Value {
        let now = chrono::Utc::now().timestamp();
        json!({
            "iss": format!("{ISSUER_PREFIX}{PROJECT}"),
            "aud": PROJECT,
            "sub": sub,
            "iat": now - 10,
            "auth_time": now - 10,
            "exp": now + 3600,
            "email": "u1@example.com",
        })
    }

    fn sign_with_kid(claims: &Value, kid: &str) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(KEY_PEM.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, claims, &key)?)
    }

    fn sign(claims: &Value) -> Result<String> {
        sign_with_kid(claims, "test-key-1")
    }

    async fn rejected(verifier: &FirebaseVerifier, token: &str) -> bool {
        matches!(verifier.verify(token).await, Err(VerifyError::Rejected(_)))
    }

    #[tokio::test]
    async fn accepts_valid_token() -> Result<()> {
        let token = sign(&claims("U1"))?;

        let identity = verifier()?.verify(&token).await?;

        assert_eq!(
            identity,
            DecodedIdentity {
                subject_id: "U1".to_string(),
                email: Some("u1@example.com".to_string()),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn oversized_leeway_is_clamped() -> Result<()> {
        let account = ServiceAccount::new(PROJECT, "admin@receiving-dock.test", KEY_PEM)?;
        let keys = Arc::new(StaticKeySource::from_jwk_set_json(JWKS)?);
        let verifier = FirebaseVerifier::new(&account, keys, 10_000_000_000);

        let identity = verifier.verify(&sign(&claims("U1"))?).await?;
        assert_eq!(identity.subject_id, "U1");

        // a token expired well beyond the cap is still refused
        let mut c = claims("U1");
        let past = chrono::Utc::now().timestamp() - 7200;
        c["iat"] = json!(past - 3600);
        c["auth_time"] = json!(past - 3600);
        c["exp"] = json!(past);
        assert!(rejected(&verifier, &sign(&c)?).await);
        Ok(())
    }

    #[tokio::test]
    async fn email_is_optional() -> Result<()> {
        let mut c = claims("U2");
        if let Some(obj) = c.as_object_mut() {
            obj.remove("email");
        }
        let token = sign(&c)?;

        let identity = verifier()?.verify(&token).await?;

        assert_eq!(identity.subject_id, "U2");
        assert_eq!(identity.email, None);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_garbage() -> Result<()> {
        assert!(rejected(&verifier()?, "not-a-jwt").await);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_expired_token() -> Result<()> {
        let mut c = claims("U1");
        let past = chrono::Utc::now().timestamp() - 7200;
        c["iat"] = json!(past - 3600);
        c["auth_time"] = json!(past - 3600);
        c["exp"] = json!(past);

        assert!(rejected(&verifier()?, &sign(&c)?).await);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_other_project_audience() -> Result<()> {
        let mut c = claims("U1");
        c["aud"] = json!("someone-else");

        assert!(rejected(&verifier()?, &sign(&c)?).await);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_wrong_issuer() -> Result<()> {
        let mut c = claims("U1");
        c["iss"] = json!("https://accounts.example.com");

        assert!(rejected(&verifier()?, &sign(&c)?).await);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_tampered_signature() -> Result<()> {
        let token = sign(&claims("U1"))?;
        let (head, sig) = token.rsplit_once('.').unwrap_or((&token, ""));
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{head}.{flipped}{}", &sig[1..]);

        assert!(rejected(&verifier()?, &tampered).await);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_unknown_kid() -> Result<()> {
        let token = sign_with_kid(&claims("U1"), "rotated-away")?;

        let res = verifier()?.verify(&token).await;
        assert!(matches!(
            res,
            Err(VerifyError::Rejected(RejectReason::UnknownKid(kid))) if kid == "rotated-away"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_empty_subject() -> Result<()> {
        let token = sign(&claims(""))?;

        let res = verifier()?.verify(&token).await;
        assert!(matches!(res, Err(VerifyError::Rejected(_))));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_overlong_subject() -> Result<()> {
        let token = sign(&claims(&"x".repeat(129)))?;

        let res = verifier()?.verify(&token).await;
        assert!(matches!(
            res,
            Err(VerifyError::Rejected(RejectReason::InvalidClaim("sub")))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_future_auth_time() -> Result<()> {
        let mut c = claims("U1");
        c["auth_time"] = json!(chrono::Utc::now().timestamp() + 3600);

        let res = verifier()?.verify(&sign(&c)?).await;
        assert!(matches!(
            res,
            Err(VerifyError::Rejected(RejectReason::InvalidClaim("auth_time")))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_missing_auth_time() -> Result<()> {
        let mut c = claims("U1");
        if let Some(obj) = c.as_object_mut() {
            obj.remove("auth_time");
        }

        let res = verifier()?.verify(&sign(&c)?).await;
        assert!(matches!(
            res,
            Err(VerifyError::Rejected(RejectReason::MissingClaim("auth_time")))
        ));
        Ok(())
    }

    struct BrokenKeys;

    #[async_trait]
    impl KeySource for BrokenKeys {
        async fn decoding_key(
            &self,
            _kid: &str,
        ) -> Result<Option<jsonwebtoken::DecodingKey>, KeySourceError> {
            Err(KeySourceError::InvalidKeySet("backend down".to_string()))
        }
    }

    #[tokio::test]
    async fn key_source_failure_is_unavailable_not_rejected() -> Result<()> {
        let token = sign(&claims("U1"))?;

        let res = verifier_with(Arc::new(BrokenKeys))?.verify(&token).await;
        assert!(matches!(res, Err(VerifyError::Unavailable(_))));
        Ok(())
    }
}
