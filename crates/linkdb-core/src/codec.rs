//! Datastore codec
//!
//! The whole link set is stored as one text blob:
//!
//! ```text
//! DATASTORE_PREFIX + base64(deflate(json(links))) + DATASTORE_SUFFIX
//! ```
//!
//! The markers make the file self-delimiting, so whitespace an editor or
//! transfer tool adds around them is ignored on decode.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::models::Link;

/// Marker written before the encoded payload
pub const DATASTORE_PREFIX: &str = "-----BEGIN LINKDB DATASTORE-----\n";

/// Marker written after the encoded payload
pub const DATASTORE_SUFFIX: &str = "\n-----END LINKDB DATASTORE-----\n";

/// Errors that can occur while encoding or decoding a datastore blob
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("missing datastore {0} marker")]
    MissingMarker(&'static str),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("deflate stream error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("invalid link data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Encode the full link set into a datastore blob
pub fn encode(links: &BTreeMap<String, Link>) -> Result<String, CodecError> {
    let json = serde_json::to_vec(links)?;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    let payload = STANDARD.encode(compressed);

    let mut blob =
        String::with_capacity(DATASTORE_PREFIX.len() + payload.len() + DATASTORE_SUFFIX.len());
    blob.push_str(DATASTORE_PREFIX);
    blob.push_str(&payload);
    blob.push_str(DATASTORE_SUFFIX);
    Ok(blob)
}

/// Decode a datastore blob back into the link set
///
/// Fails on missing markers or any corruption in the payload; a partial
/// link set is never returned.
pub fn decode(blob: &str) -> Result<BTreeMap<String, Link>, CodecError> {
    let payload = blob
        .trim()
        .strip_prefix(DATASTORE_PREFIX.trim())
        .ok_or(CodecError::MissingMarker("prefix"))?
        .strip_suffix(DATASTORE_SUFFIX.trim())
        .ok_or(CodecError::MissingMarker("suffix"))?
        .trim();

    let compressed = STANDARD.decode(payload)?;

    let mut json = Vec::new();
    DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;

    Ok(serde_json::from_slice(&json)?)
}
