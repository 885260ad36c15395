//! Bearer token issuing and verification.
//!
//! Tokens are compact, self-signed credentials made of three base64 segments
//! joined by `.`:
//!
//! ```text
//! base64({"alg":"HS256","typ":"JWT"}) . base64(claims) . base64(signature)
//!
//! signature = HMAC-SHA256(secret, "{header}.{payload}")
//! ```
//!
//! The signature is computed over the *encoded* header and payload segments,
//! so verification never needs to decode the claims. A token is valid iff the
//! recomputed signature string is identical to the third segment. Tokens carry
//! no expiry.
//!
//! # Example
//!
//! ```rust
//! use record_gate::token::{Claims, HmacTokenService, TokenService};
//!
//! let tokens = HmacTokenService::new("my-secret-key");
//!
//! let mut claims = Claims::new();
//! claims.insert("username".to_string(), "admin".into());
//!
//! let token = tokens.issue(&claims).unwrap();
//! assert!(tokens.verify(&token));
//! assert_eq!(tokens.claims(&token), Some(claims));
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::TokenError;

/// HMAC-SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

/// Arbitrary claims carried in a token payload.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Fixed token header.
#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

// =============================================================================
// TokenService Trait
// =============================================================================

/// Issues and verifies bearer tokens.
///
/// The dispatcher only depends on this trait, so the signing scheme can be
/// replaced without touching routing or handlers.
pub trait TokenService: Send + Sync {
    /// Issue a signed token carrying `claims`.
    fn issue(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Check whether `token` carries a valid signature.
    ///
    /// Malformed tokens are reported as invalid, never as an error.
    fn verify(&self, token: &str) -> bool;

    /// Decode the claims of a token that passes [`TokenService::verify`].
    fn claims(&self, token: &str) -> Option<Claims>;
}

// =============================================================================
// HMAC Token Service
// =============================================================================

/// Token service signing with HMAC-SHA256 and a process-wide secret.
#[derive(Clone)]
pub struct HmacTokenService {
    /// Secret key for HMAC computation
    secret_key: Vec<u8>,
}

impl HmacTokenService {
    /// Create a token service with the given secret key.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
        }
    }

    /// Compute the base64-encoded signature over `"{header}.{payload}"`.
    fn compute_signature(&self, header: &str, payload: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC can take key of any size");
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());

        STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl TokenService for HmacTokenService {
    fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = STANDARD.encode(serde_json::to_vec(&HEADER)?);
        let payload = STANDARD.encode(serde_json::to_vec(claims)?);
        let signature = self.compute_signature(&header, &payload);

        Ok(format!("{}.{}.{}", header, payload, signature))
    }

    fn verify(&self, token: &str) -> bool {
        let Some((header, payload, signature)) = split_token(token) else {
            return false;
        };

        let expected = self.compute_signature(header, payload);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }

    fn claims(&self, token: &str) -> Option<Claims> {
        if !self.verify(token) {
            return None;
        }
        let (_, payload, _) = split_token(token)?;
        let raw = STANDARD.decode(payload).ok()?;
        serde_json::from_slice(&raw).ok()
    }
}

/// Split a token into exactly three `.`-delimited segments.
fn split_token(token: &str) -> Option<(&str, &str, &str)> {
    let mut segments = token.split('.');
    let header = segments.next()?;
    let payload = segments.next()?;
    let signature = segments.next()?;

    if segments.next().is_some() {
        return None;
    }
    Some((header, payload, signature))
}

// =============================================================================
// Tests
// =============================================================================
