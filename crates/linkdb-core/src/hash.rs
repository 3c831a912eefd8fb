//! Permalink tokens
//!
//! A small hash is the CRC-32 of a link's key, written big-endian and
//! encoded as unpadded URL-safe base64. Four bytes always encode to six
//! characters, and the token depends only on the key string, so it is
//! stable across runs and platforms.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Compute the permalink token for a key
pub fn small_hash(key: &str) -> String {
    let crc = crc32fast::hash(key.as_bytes());
    URL_SAFE_NO_PAD.encode(crc.to_be_bytes())
}
