//! Common outbound request headers shared by HEAD probes and range fetches.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Identity/auth fields that shape the common header set.
#[derive(Debug, Clone, Default)]
pub struct CommonHeadersConfig {
    /// `Authorization: Basic base64(uuid+":")` sent when set.
    pub uuid: Option<String>,
    /// Adds `Accept: application/metalink+xml, */*`, used for HEAD probes.
    pub accept_metalink: bool,
}

/// Builds the header list sent on every outbound fetch: identifying
/// `User-Agent`, cache-busting, and the `Want-Digest` hint that asks
/// Metalink-aware servers to include a `Digest` response header.
pub fn common_headers(cfg: &CommonHeadersConfig) -> Vec<(String, String)> {
    let mut headers = vec![
        ("User-Agent".to_string(), "pyMetalink/6.x".to_string()),
        ("Cache-Control".to_string(), "no-cache".to_string()),
        ("Pragma".to_string(), "no-cache".to_string()),
        ("Accept-Encoding".to_string(), "gzip".to_string()),
        (
            "Want-Digest".to_string(),
            "md5,sha,sha-256,sha-384,sha-512".to_string(),
        ),
    ];
    if cfg.accept_metalink {
        headers.push((
            "Accept".to_string(),
            "application/metalink+xml, */*".to_string(),
        ));
    }
    if let Some(uuid) = &cfg.uuid {
        let token = BASE64.encode(format!("{}:", uuid));
        headers.push(("Authorization".to_string(), format!("Basic {}", token)));
    }
    headers
}
