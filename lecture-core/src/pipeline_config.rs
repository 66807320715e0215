//! Typed view over the environment variables SPEC_FULL.md §6/§10.3 names,
//! layered on top of [`crate::config::DogConfig`].

use std::time::Duration;

use crate::config::DogConfig;

/// Process-wide pipeline configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub host: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub aws_region: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub jwt_private: Option<String>,
    pub domain: String,
    pub api_only: bool,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub stage_timeout: Duration,
    pub synthesis_poll_tick: Duration,
    pub synthesis_deadline: Duration,
    pub worker_concurrency: usize,
    pub transcript_host_allowlist: Vec<String>,
    /// Organization email domain `/callback` requires a profile to carry
    /// (SPEC_FULL.md §6 — the original source hardcoded a single campus
    /// domain; generalized here the same way the transcript host was).
    /// `None` means no restriction.
    pub allowed_email_domain: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redis_url: None,
            aws_region: None,
            google_client_id: None,
            google_client_secret: None,
            jwt_private: None,
            domain: "localhost".to_string(),
            api_only: false,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            stage_timeout: Duration::from_secs(3600),
            synthesis_poll_tick: Duration::from_secs(5),
            synthesis_deadline: Duration::from_secs(120),
            worker_concurrency: 4,
            transcript_host_allowlist: vec!["cdnapi.kaltura.com".to_string()],
            allowed_email_domain: None,
        }
    }
}

impl PipelineConfig {
    /// Load from a [`DogConfig`] store that has already been populated
    /// (e.g. by [`Self::load_env_into`]).
    pub fn from_config(cfg: &DogConfig) -> Self {
        let defaults = Self::default();
        Self {
            host: cfg
                .get("host")
                .map(str::to_string)
                .unwrap_or(defaults.host),
            port: cfg
                .get("port")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            redis_url: cfg.get("redis_url").map(str::to_string),
            aws_region: cfg.get("aws_region").map(str::to_string),
            google_client_id: cfg.get("google_client_id").map(str::to_string),
            google_client_secret: cfg.get("google_client_secret").map(str::to_string),
            jwt_private: cfg.get("jwt_private").map(str::to_string),
            domain: cfg
                .get("domain")
                .map(str::to_string)
                .unwrap_or(defaults.domain),
            api_only: cfg
                .get("api_only")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.api_only),
            ffmpeg_bin: cfg
                .get("ffmpeg_bin")
                .map(str::to_string)
                .unwrap_or(defaults.ffmpeg_bin),
            ffprobe_bin: cfg
                .get("ffprobe_bin")
                .map(str::to_string)
                .unwrap_or(defaults.ffprobe_bin),
            stage_timeout: cfg
                .get("stage_timeout_secs")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.stage_timeout),
            synthesis_poll_tick: cfg
                .get("synthesis_poll_tick_secs")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.synthesis_poll_tick),
            synthesis_deadline: cfg
                .get("synthesis_deadline_secs")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.synthesis_deadline),
            worker_concurrency: cfg
                .get("worker_concurrency")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.worker_concurrency),
            transcript_host_allowlist: cfg
                .get("transcript_host_allowlist")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.transcript_host_allowlist),
            allowed_email_domain: cfg.get("allowed_email_domain").map(str::to_string),
        }
    }

    /// Populate a [`DogConfig`] from the process environment using the
    /// variable names SPEC_FULL.md §6/§10.3 names, lowercased into keys.
    pub fn load_env_into(cfg: &mut DogConfig) {
        const KEYS: &[(&str, &str)] = &[
            ("HOST", "host"),
            ("PORT", "port"),
            ("REDIS_URL", "redis_url"),
            ("AWS_REGION", "aws_region"),
            ("GOOGLE_CLIENT_ID", "google_client_id"),
            ("GOOGLE_CLIENT_SECRET", "google_client_secret"),
            ("JWT_PRIVATE", "jwt_private"),
            ("DOMAIN", "domain"),
            ("API_ONLY", "api_only"),
            ("FFMPEG_BIN", "ffmpeg_bin"),
            ("FFPROBE_BIN", "ffprobe_bin"),
            ("STAGE_TIMEOUT_SECS", "stage_timeout_secs"),
            ("SYNTHESIS_POLL_TICK_SECS", "synthesis_poll_tick_secs"),
            ("SYNTHESIS_DEADLINE_SECS", "synthesis_deadline_secs"),
            ("WORKER_CONCURRENCY", "worker_concurrency"),
            ("TRANSCRIPT_HOST_ALLOWLIST", "transcript_host_allowlist"),
            ("ALLOWED_EMAIL_DOMAIN", "allowed_email_domain"),
        ];
        for (env_key, cfg_key) in KEYS {
            if let Ok(value) = std::env::var(env_key) {
                cfg.set(*cfg_key, value);
            }
        }
    }

    /// Convenience: load straight from the process environment.
    pub fn from_env() -> Self {
        let mut cfg = DogConfig::new();
        Self::load_env_into(&mut cfg);
        Self::from_config(&cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.api_only);
        assert_eq!(cfg.transcript_host_allowlist, vec!["cdnapi.kaltura.com"]);
    }

    #[test]
    fn from_config_overrides_defaults() {
        let mut store = DogConfig::new();
        store.set("port", "9090");
        store.set("api_only", "true");
        store.set("worker_concurrency", "16");
        let cfg = PipelineConfig::from_config(&store);
        assert_eq!(cfg.port, 9090);
        assert!(cfg.api_only);
        assert_eq!(cfg.worker_concurrency, 16);
    }
}
