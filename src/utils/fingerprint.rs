//! Per-client rate-limit keys.

use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Derives a stable, non-reversible identifier from a client address.
///
/// The fingerprint is an HMAC-SHA256 of the address keyed by the server
/// hash key, hex-encoded. Raw addresses never reach the ledger.
#[derive(Clone)]
pub struct Fingerprinter {
    mac: HmacSha256,
}

impl Fingerprinter {
    /// # Errors
    ///
    /// Propagates the MAC key error. HMAC accepts keys of any length, so this
    /// does not fail in practice.
    pub fn new(hash_key: &str) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(hash_key.as_bytes())?,
        })
    }

    /// Returns the 64-character lowercase hex fingerprint of `client_ip`.
    pub fn fingerprint(&self, client_ip: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(client_ip.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
