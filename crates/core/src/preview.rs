use base64::{engine::general_purpose, Engine as _};

const FALLBACK_MIME: &str = "application/octet-stream";

pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK_MIME)
}

/// `data:` URL suitable for an `<img src>`.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}
