//! gzip framing helpers for `Content-Encoding: gzip` bodies.

use std::io::{Read, Write};

use axum::http::{header, HeaderMap};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// `Content-Encoding` token for gzip.
pub const GZIP: &str = "gzip";
const IDENTITY: &str = "identity";

/// Whether the headers declare a gzip-encoded body.
pub fn is_gzip_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case(GZIP))
        .unwrap_or(false)
}

/// Whether the body can be read as JSON, possibly after gunzip.
///
/// Bodies in any other encoding (`br`, `deflate`, ...) are relayed as received.
pub fn is_rewritable_encoding(headers: &HeaderMap) -> bool {
    match headers.get(header::CONTENT_ENCODING) {
        None => true,
        Some(value) => value
            .to_str()
            .map(|v| {
                let v = v.trim();
                v.is_empty() || v.eq_ignore_ascii_case(IDENTITY) || v.eq_ignore_ascii_case(GZIP)
            })
            .unwrap_or(false),
    }
}

/// Gunzip `data`, reading at most `limit + 1` decoded bytes.
///
/// A result longer than `limit` means the document exceeds it.
pub fn decompress(data: &[u8], limit: usize) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data).take(limit as u64 + 1);
    let mut out = Vec::with_capacity(data.len().saturating_mul(4).min(limit.saturating_add(1)));
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

pub fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
