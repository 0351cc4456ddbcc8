//! HS512-signed JWT issuance and verification.
//!
//! Expiry is checked against the injected [`Clock`] rather than inside
//! `jsonwebtoken`, so tests can move time forward without sleeping.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{AuthError, AuthResult};

/// Minimum decoded key length for HS512 (one SHA-512 block).
pub const MIN_SECRET_BYTES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

/// A freshly signed token and its expiry in unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Builds a codec from a base64-encoded secret.
    ///
    /// # Errors
    ///
    /// [`AuthError::ConfigInvalid`] if the secret is not valid base64 or
    /// decodes to fewer than [`MIN_SECRET_BYTES`] bytes.
    pub fn new(secret_b64: &str, ttl: Duration, clock: Arc<dyn Clock>) -> AuthResult<Self> {
        let secret = STANDARD
            .decode(secret_b64.trim())
            .map_err(|e| AuthError::ConfigInvalid(format!("jwt secret is not valid base64: {e}")))?;

        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::ConfigInvalid(format!(
                "jwt secret must decode to at least {MIN_SECRET_BYTES} bytes, got {}",
                secret.len()
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            ttl,
            clock,
        })
    }

    /// Signs a token for `subject` valid from now until now + TTL.
    pub fn issue(&self, subject: &str) -> AuthResult<IssuedToken> {
        let iat = self.clock.unix_secs();
        let exp = iat.saturating_add(self.ttl.as_secs());

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ConfigInvalid(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at: exp,
        })
    }

    /// Returns the subject of a valid, unexpired token.
    ///
    /// Every failure collapses to [`AuthError::TokenInvalid`]; the specific
    /// cause only reaches the debug log.
    pub fn verify(&self, token: &str) -> AuthResult<String> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                match e.kind() {
                    ErrorKind::InvalidSignature => tracing::debug!("JWT signature mismatch"),
                    ErrorKind::InvalidAlgorithm => tracing::debug!("JWT uses unexpected algorithm"),
                    _ => tracing::debug!("Malformed JWT: {e}"),
                }
                return Err(AuthError::TokenInvalid);
            }
        };

        let now = self.clock.unix_secs();
        if now > claims.exp {
            tracing::debug!("Expired JWT for subject {} (exp={}, now={now})", claims.sub, claims.exp);
            return Err(AuthError::TokenInvalid);
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SystemClock};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn secret() -> String {
        STANDARD.encode([7u8; 64])
    }

    fn codec(ttl_secs: u64) -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let codec = TokenCodec::new(&secret(), Duration::from_secs(ttl_secs), clock.clone()).unwrap();
        (codec, clock)
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let (codec, _) = codec(3600);
        let issued = codec.issue("alice").unwrap();
        assert_eq!(codec.verify(&issued.token).unwrap(), "alice");
    }

    #[test]
    fn token_has_three_segments_and_hs512_header() {
        let (codec, _) = codec(3600);
        let issued = codec.issue("alice").unwrap();
        assert_eq!(issued.token.split('.').count(), 3);
        let header = jsonwebtoken::decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::HS512);
    }

    #[test]
    fn expires_at_is_now_plus_ttl() {
        let (codec, clock) = codec(900);
        let issued = codec.issue("alice").unwrap();
        assert_eq!(issued.expires_at, clock.unix_secs() + 900);
    }

    #[test]
    fn token_valid_until_expiry_then_invalid() {
        let (codec, clock) = codec(60);
        let issued = codec.issue("alice").unwrap();

        clock.advance(Duration::from_secs(60));
        assert_eq!(codec.verify(&issued.token).unwrap(), "alice");

        clock.advance(Duration::from_secs(1));
        assert!(matches!(codec.verify(&issued.token), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn flipping_any_signature_bit_invalidates() {
        let (codec, _) = codec(3600);
        let issued = codec.issue("alice").unwrap();
        let (signed_part, signature) = issued.token.rsplit_once('.').unwrap();
        let signature = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for bit in 0..signature.len() * 8 {
            let mut tampered = signature.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            let token = format!("{signed_part}.{}", URL_SAFE_NO_PAD.encode(&tampered));
            assert!(
                matches!(codec.verify(&token), Err(AuthError::TokenInvalid)),
                "bit {bit} flip was accepted"
            );
        }
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let (codec, _) = codec(3600);
        let issued = codec.issue("alice").unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(r#"{"sub":"mallory","iat":0,"exp":99999999999}"#);
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert!(matches!(codec.verify(&forged), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn token_from_other_key_is_invalid() {
        let (codec, _) = codec(3600);
        let other = TokenCodec::new(
            &STANDARD.encode([9u8; 64]),
            Duration::from_secs(3600),
            Arc::new(SystemClock),
        )
        .unwrap();
        let issued = other.issue("alice").unwrap();
        assert!(matches!(codec.verify(&issued.token), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn garbage_is_invalid() {
        let (codec, _) = codec(3600);
        for token in ["", "abc", "a.b.c", "a.b", "...."] {
            assert!(matches!(codec.verify(token), Err(AuthError::TokenInvalid)));
        }
    }

    #[test]
    fn failure_causes_are_indistinguishable() {
        let (codec, clock) = codec(10);
        let issued = codec.issue("alice").unwrap();
        let malformed = codec.verify("not-a-token").unwrap_err().to_string();
        clock.advance(Duration::from_secs(11));
        let expired = codec.verify(&issued.token).unwrap_err().to_string();
        assert_eq!(malformed, expired);
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = TokenCodec::new(
            &STANDARD.encode([1u8; 32]),
            Duration::from_secs(60),
            Arc::new(SystemClock),
        );
        assert!(matches!(result, Err(AuthError::ConfigInvalid(_))));
    }

    #[test]
    fn non_base64_secret_is_rejected() {
        let result = TokenCodec::new("not base64!!", Duration::from_secs(60), Arc::new(SystemClock));
        assert!(matches!(result, Err(AuthError::ConfigInvalid(_))));
    }
}
