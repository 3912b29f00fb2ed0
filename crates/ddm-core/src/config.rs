use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/ddm/config.toml`.
///
/// This is the single mutable-configuration value threaded into the
/// Orchestrator, Segment Manager, and Transport: identity fields
/// (`uuid`/`lang`/`country`/`os_tag`) are read once at load time from the
/// environment and never mutated afterward, replacing the original
/// program's process-global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdmConfig {
    /// Maximum total concurrent HTTP connections across all jobs.
    pub max_total_connections: usize,
    /// Maximum concurrent HTTP connections per host.
    pub max_connections_per_host: usize,
    /// Minimum number of segments per job.
    pub min_segments: usize,
    /// Maximum number of segments per job.
    pub max_segments: usize,

    /// Basic-auth identifier sent as `Authorization: Basic base64(uuid+":")`
    /// on every outbound fetch, when set.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub uuid: Option<String>,
    /// Process-wide language tag used by the Source Resolver's locale filter.
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Process-wide 2-letter country code used by mirror ordering (`start_sort`).
    #[serde(default)]
    pub country: String,
    /// Process-wide OS tag used by the Source Resolver's locale filter.
    #[serde(default = "default_os_tag")]
    pub os_tag: String,

    /// Simultaneous connections allowed per mirror URL.
    #[serde(default = "default_limit_per_host")]
    pub limit_per_host: usize,
    /// Distinct mirrors allowed concurrently.
    #[serde(default = "default_host_limit")]
    pub host_limit: usize,
    /// Maximum HTTP redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    /// FTP reconnect attempts on transient socket errors.
    #[serde(default = "default_connect_retry_count")]
    pub connect_retry_count: u32,
    /// Upper bound on piece count before piece_size is auto-raised.
    #[serde(default = "default_max_chunks")]
    pub max_chunks: u64,
    /// Default piece size in bytes when a `FileSpec` does not specify one.
    #[serde(default = "default_chunk_size")]
    pub default_chunk_size: u64,
}

fn default_lang() -> String {
    std::env::var("LANG").unwrap_or_else(|_| "any".to_string())
}

fn default_os_tag() -> String {
    std::env::consts::OS.to_string()
}

fn default_limit_per_host() -> usize {
    1
}

fn default_host_limit() -> usize {
    5
}

fn default_max_redirects() -> u32 {
    20
}

fn default_connect_retry_count() -> u32 {
    3
}

fn default_max_chunks() -> u64 {
    256
}

fn default_chunk_size() -> u64 {
    262_144
}

impl Default for DdmConfig {
    fn default() -> Self {
        Self {
            max_total_connections: 64,
            max_connections_per_host: 16,
            min_segments: 4,
            max_segments: 16,
            uuid: None,
            lang: default_lang(),
            country: String::new(),
            os_tag: default_os_tag(),
            limit_per_host: default_limit_per_host(),
            host_limit: default_host_limit(),
            max_redirects: default_max_redirects(),
            connect_retry_count: default_connect_retry_count(),
            max_chunks: default_max_chunks(),
            default_chunk_size: default_chunk_size(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ddm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DdmConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DdmConfig::default();
        assert_eq!(cfg.max_total_connections, 64);
        assert_eq!(cfg.max_connections_per_host, 16);
        assert_eq!(cfg.min_segments, 4);
        assert_eq!(cfg.max_segments, 16);
        assert_eq!(cfg.limit_per_host, 1);
        assert_eq!(cfg.host_limit, 5);
        assert_eq!(cfg.max_redirects, 20);
        assert_eq!(cfg.connect_retry_count, 3);
        assert_eq!(cfg.max_chunks, 256);
        assert_eq!(cfg.default_chunk_size, 262_144);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DdmConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DdmConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.max_total_connections, cfg.max_total_connections);
        assert_eq!(parsed.max_connections_per_host, cfg.max_connections_per_host);
        assert_eq!(parsed.min_segments, cfg.min_segments);
        assert_eq!(parsed.max_segments, cfg.max_segments);
        assert_eq!(parsed.max_chunks, cfg.max_chunks);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            max_total_connections = 8
            max_connections_per_host = 4
            min_segments = 2
            max_segments = 32
        "#;
        let cfg: DdmConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_total_connections, 8);
        assert_eq!(cfg.max_connections_per_host, 4);
        assert_eq!(cfg.min_segments, 2);
        assert_eq!(cfg.max_segments, 32);
        // Protocol constants fall back to their spec-mandated defaults when
        // a config file predates them.
        assert_eq!(cfg.limit_per_host, 1);
        assert_eq!(cfg.host_limit, 5);
        assert_eq!(cfg.max_chunks, 256);
    }
}
