// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed, expiring OAuth `state` values.
//!
//! A state is `base64url(nonce.issued_at.receiver_hash) "." base64url(hmac)`,
//! where `receiver_hash` is the hex SHA-256 of the receiver URL and the HMAC
//! (SHA-256) is keyed by the client secret. Verification needs no server-side
//! storage.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use agora_core::AgoraError;

type HmacSha256 = Hmac<Sha256>;

/// Tolerated clock skew for states issued "in the future".
const MAX_SKEW_SECS: u64 = 60;

/// Issues and verifies states for one client secret.
pub(crate) struct StateCodec<'a> {
    secret: &'a [u8],
    ttl_secs: u64,
}

impl<'a> StateCodec<'a> {
    pub(crate) fn new(secret: &'a str, ttl_secs: u64) -> Self {
        Self {
            secret: secret.as_bytes(),
            ttl_secs,
        }
    }

    fn mac(&self) -> Result<HmacSha256, AgoraError> {
        HmacSha256::new_from_slice(self.secret)
            .map_err(|e| AgoraError::Internal(format!("cannot key state signature: {e}")))
    }

    /// A fresh state bound to `receiver_url`, issued at `now` (Unix seconds).
    pub(crate) fn issue(&self, receiver_url: &str, now: u64) -> Result<String, AgoraError> {
        let nonce: [u8; 16] = rand::random();
        let payload = format!(
            "{}.{now}.{}",
            hex::encode(nonce),
            receiver_hash(receiver_url)
        );
        let encoded = URL_SAFE_NO_PAD.encode(payload.as_bytes());

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{encoded}.{signature}"))
    }

    /// Checks signature, age and receiver binding of `state` at `now`.
    pub(crate) fn verify(&self, state: &str, receiver_url: &str, now: u64) -> Result<(), AgoraError> {
        let reject = |reason: &str| AgoraError::Authentication(format!("invalid state: {reason}"));

        let (encoded, signature) = state.rsplit_once('.').ok_or_else(|| reject("malformed"))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| reject("malformed signature"))?;
        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| reject("signature mismatch"))?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| reject("malformed payload"))?;
        let mut parts = payload.splitn(3, '.');
        let (Some(_nonce), Some(issued_at), Some(hash)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(reject("malformed payload"));
        };
        let issued_at: u64 = issued_at.parse().map_err(|_| reject("malformed timestamp"))?;

        if issued_at > now.saturating_add(MAX_SKEW_SECS) {
            return Err(reject("issued in the future"));
        }
        if now.saturating_sub(issued_at) > self.ttl_secs {
            return Err(reject("expired"));
        }
        if hash != receiver_hash(receiver_url) {
            return Err(reject("receiver mismatch"));
        }
        Ok(())
    }
}

fn receiver_hash(receiver_url: &str) -> String {
    hex::encode(Sha256::digest(receiver_url.as_bytes()))
}
