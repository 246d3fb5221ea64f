//! Gzip response compression for endpoints declared with `compress`.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, VARY};
use http::{HeaderMap, HeaderValue};
use vestibule_core::ResponseState;

/// Returns true if `Accept-Encoding` lists gzip (or `*`) with a non-zero
/// quality.
pub(crate) fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|part| {
            let mut pieces = part.split(';');
            let encoding = pieces.next().unwrap_or_default().trim();
            if !encoding.eq_ignore_ascii_case("gzip") && encoding != "*" {
                return false;
            }
            let quality = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            quality > 0.0
        })
}

/// Gzips the body in place. Empty bodies and bodies that already carry a
/// `Content-Encoding` are left alone.
pub(crate) fn gzip_response(response: &mut ResponseState) -> std::io::Result<()> {
    if response.body.is_empty() || response.headers.contains_key(CONTENT_ENCODING) {
        return Ok(());
    }

    let mut encoder = GzEncoder::new(Vec::with_capacity(response.body.len() / 2), Compression::default());
    encoder.write_all(&response.body)?;
    response.body = encoder.finish()?;

    response
        .headers
        .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    response
        .headers
        .append(VARY, HeaderValue::from_static("accept-encoding"));
    Ok(())
}
