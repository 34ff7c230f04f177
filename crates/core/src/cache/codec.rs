//! Body encoding for the TEXT `body` column.
//!
//! Bodies are zlib-compressed, then base64-encoded so arbitrary bytes survive
//! a text column unchanged.

use std::io::{Read, Write};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::Error;

/// Compress and encode a response body for storage.
pub fn encode_body(body: &[u8]) -> Result<String, Error> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
    encoder
        .write_all(body)
        .map_err(|e| Error::CacheCorrupt(format!("failed to compress body: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| Error::CacheCorrupt(format!("failed to compress body: {e}")))?;
    Ok(BASE64.encode(compressed))
}

/// Decode and decompress a stored body.
pub fn decode_body(stored: &str) -> Result<Vec<u8>, Error> {
    let compressed = BASE64
        .decode(stored.as_bytes())
        .map_err(|e| Error::CacheCorrupt(format!("invalid base64 payload: {e}")))?;

    let mut body = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut body)
        .map_err(|e| Error::CacheCorrupt(format!("invalid zlib payload: {e}")))?;
    Ok(body)
}
