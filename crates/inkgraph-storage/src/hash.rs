//! Content digests for duplicate detection, using blake3.
//!
//! Two payloads with the same [`ContentDigest`] are treated as the same
//! image. The digest is derived state: it is recomputed from stored bytes
//! whenever needed and never persisted.

use std::fmt;
use std::io::Read;

/// Fixed-size fingerprint of a byte payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(blake3::Hash);

impl ContentDigest {
    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Lower-case hex encoding.
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.0.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// Computes the digest of an in-memory payload.
pub fn digest(bytes: &[u8]) -> ContentDigest {
    ContentDigest(blake3::hash(bytes))
}

/// Computes the digest of everything `reader` yields, without buffering
/// the whole payload.
pub fn digest_reader(reader: impl Read) -> std::io::Result<ContentDigest> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(reader)?;
    Ok(ContentDigest(hasher.finalize()))
}
