// Application configuration, loaded from environment variables and CLI flags.

use std::time::Duration;

use crate::decision::ReasoningMode;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// Settings for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API credential. `None` disables every model-backed feature.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 1,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    pub gemini: GeminiConfig,
    /// How the zone-decision endpoint explains its pick.
    pub zone_reasoning: ReasoningMode,
    /// CORS origin allow-list. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `HOST` - bind address (default: `0.0.0.0`)
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `GEMINI_API_KEY` - model credential (no default)
    /// - `GEMINI_MODEL` - model name (default: `gemini-2.5-flash`)
    /// - `GEMINI_TEMPERATURE` - sampling temperature (default: 0.6)
    /// - `GEMINI_BASE_URL` - API root
    /// - `GEMINI_TIMEOUT_SECS` - per-attempt timeout (default: 10)
    /// - `GEMINI_MAX_RETRIES` - retries on transient errors (default: 1)
    /// - `ZONE_REASONING` - `template` or `llm` (default: `template`)
    /// - `CORS_ALLOWED_ORIGINS` - comma-separated origins (default: any)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--reasoning <MODE>` - Override `ZONE_REASONING`
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from CLI args and an environment lookup.
    pub fn from_sources<F>(args: &[String], env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = env("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .or_else(|| env("PORT"))
            .map(|v| parse_or("PORT", &v, 8000))
            .unwrap_or(8000);

        let defaults = GeminiConfig::default();
        let api_key = env("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        let model = env("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.model);
        let temperature = env("GEMINI_TEMPERATURE")
            .map(|v| parse_or("GEMINI_TEMPERATURE", &v, DEFAULT_TEMPERATURE))
            .unwrap_or(DEFAULT_TEMPERATURE)
            .clamp(0.0, 2.0);
        let base_url = env("GEMINI_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let timeout = env("GEMINI_TIMEOUT_SECS")
            .map(|v| Duration::from_secs(parse_or("GEMINI_TIMEOUT_SECS", &v, 10)))
            .unwrap_or(defaults.timeout);
        let max_retries = env("GEMINI_MAX_RETRIES")
            .map(|v| parse_or("GEMINI_MAX_RETRIES", &v, defaults.max_retries))
            .unwrap_or(defaults.max_retries);

        let zone_reasoning = Self::parse_cli_value(args, "--reasoning")
            .or_else(|| env("ZONE_REASONING"))
            .map(|v| {
                v.parse().unwrap_or_else(|_| {
                    tracing::warn!("Unknown ZONE_REASONING value {v:?}, using template");
                    ReasoningMode::Template
                })
            })
            .unwrap_or_default();

        let cors_origins = env("CORS_ALLOWED_ORIGINS").and_then(|v| {
            let origins: Vec<String> = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        });

        Config {
            host,
            port,
            gemini: GeminiConfig {
                api_key,
                model,
                temperature,
                base_url,
                timeout,
                max_retries,
            },
            zone_reasoning,
            cors_origins,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid value {raw:?} for {key}, using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(args: &[&str], vars: &[(&str, &str)]) -> Config {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_sources(&args, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&["fitzone-backend"], &[]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert!((config.gemini.temperature - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.gemini.timeout, Duration::from_secs(10));
        assert_eq!(config.gemini.max_retries, 1);
        assert_eq!(config.zone_reasoning, ReasoningMode::Template);
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = load(
            &["fitzone-backend"],
            &[
                ("PORT", "9000"),
                ("GEMINI_API_KEY", "secret"),
                ("GEMINI_MODEL", "gemini-2.0-pro"),
                ("GEMINI_TEMPERATURE", "0.2"),
                ("GEMINI_BASE_URL", "http://127.0.0.1:9999/"),
                ("ZONE_REASONING", "llm"),
                ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ],
        );
        assert_eq!(config.port, 9000);
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini.model, "gemini-2.0-pro");
        assert!((config.gemini.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.gemini.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.zone_reasoning, ReasoningMode::Llm);
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    #[test]
    fn test_cli_flags_take_precedence() {
        let config = load(
            &["fitzone-backend", "--port", "7000", "--reasoning", "llm"],
            &[("PORT", "9000"), ("ZONE_REASONING", "template")],
        );
        assert_eq!(config.port, 7000);
        assert_eq!(config.zone_reasoning, ReasoningMode::Llm);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = load(
            &["fitzone-backend"],
            &[
                ("PORT", "not-a-port"),
                ("GEMINI_TEMPERATURE", "warm"),
                ("ZONE_REASONING", "magic"),
            ],
        );
        assert_eq!(config.port, 8000);
        assert!((config.gemini.temperature - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.zone_reasoning, ReasoningMode::Template);
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = load(&["fitzone-backend"], &[("GEMINI_API_KEY", "  ")]);
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_temperature_clamped() {
        let config = load(&["fitzone-backend"], &[("GEMINI_TEMPERATURE", "7.5")]);
        assert!((config.gemini.temperature - 2.0).abs() < f32::EPSILON);
    }
}
