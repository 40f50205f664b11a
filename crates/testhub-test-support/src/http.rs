//! Request builders for driving routers in-process.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, header};

/// Multipart boundary used by [`multipart_upload`].
pub const BOUNDARY: &str = "testhub-boundary-7d9a";

/// Build a `multipart/form-data` POST carrying one file field.
///
/// # Errors
///
/// Returns an error if the request cannot be assembled.
pub fn multipart_upload(
    uri: &str,
    field: &str,
    filename: &str,
    contents: &[u8],
) -> Result<Request<Body>> {
    let mut body = Vec::with_capacity(contents.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Ok(Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_request_carries_boundary() -> Result<()> {
        let request = multipart_upload("/upload/evm", "contract_file", "A.sol", b"contract A {}")?;
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.ends_with(BOUNDARY));
        Ok(())
    }
}
