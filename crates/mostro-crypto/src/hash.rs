use sha2::{Digest, Sha256};

/// SHA-256 over arbitrary bytes, used for both event-id computation and
/// general-purpose message hashing ahead of a Schnorr signature.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
