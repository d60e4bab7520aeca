//! Configuration recognized by the core (§6).
//!
//! Grounded in `kelora::config::KeloraConfig`'s split into semantic groups;
//! here `InputConfig` carries the format strings, `ClassifyConfig` carries
//! the record-classifier flags, and `StaticFilesConfig` the static-content
//! table. The core does not parse a config file or CLI itself — that loader
//! is an external collaborator (§1), the same non-goal as GeoIP.

/// Input format strings (§6).
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub log_format: String,
    pub date_format: String,
    pub double_decode: bool,
}

/// Record-classifier behavior flags (§4.7, §6).
#[derive(Debug, Clone, Default)]
pub struct ClassifyConfig {
    pub append_method: bool,
    pub append_protocol: bool,
    pub ignore_qstr: bool,
    pub code444_as_404: bool,
    pub client_err_to_unique_count: bool,
    pub ignore_crawlers: bool,
    pub ignore_ip_idx: bool,
    pub list_agents: bool,
    pub geoip_database: bool,
    pub ignore_referers: Vec<String>,
}

/// Static-content detection table (§4.9, §6).
#[derive(Debug, Clone, Default)]
pub struct StaticFilesConfig {
    pub extensions: Vec<String>,
    pub max_len: usize,
}

impl StaticFilesConfig {
    /// A request is static iff its length >= `max_len` and its suffix
    /// matches one of `extensions` byte-for-byte (§4.9).
    pub fn is_static(&self, req: &str) -> bool {
        if req.len() < self.max_len {
            return false;
        }
        self.extensions
            .iter()
            .any(|ext| !ext.is_empty() && req.as_bytes().ends_with(ext.as_bytes()))
    }
}

/// Top-level configuration for the core (§6).
///
/// `bandwidth_seen`/`serve_usecs_seen` mirror `conf.bandwidth`/
/// `conf.serve_usecs` in the original: they start false and are flipped by
/// the `%b`/`%T`/`%D` field parsers the first time those specifiers fire,
/// rather than being set up front — a runtime flag piggybacking on the
/// same struct, exactly as the original C `conf` global does.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: InputConfig,
    pub classify: ClassifyConfig,
    pub static_files: StaticFilesConfig,
    pub bandwidth_seen: bool,
    pub serve_usecs_seen: bool,
}

impl Config {
    pub fn new(log_format: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self {
            input: InputConfig {
                log_format: log_format.into(),
                date_format: date_format.into(),
                double_decode: false,
            },
            classify: ClassifyConfig::default(),
            static_files: StaticFilesConfig::default(),
            bandwidth_seen: false,
            serve_usecs_seen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_file_detection_requires_min_len_and_extension() {
        let cfg = StaticFilesConfig {
            extensions: vec![".png".into(), ".css".into()],
            max_len: 5,
        };
        assert!(cfg.is_static("/a.png"));
        assert!(!cfg.is_static("/a.png"[..2].to_string().as_str()));
        assert!(!cfg.is_static("/a.txt"));
    }
}
