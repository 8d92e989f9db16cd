use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

/// Default token source
pub const DEFAULT_TOKEN_SOURCE: &str = "https://dramabox-token.vercel.app/token";

/// Default DramaBox API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://sapi.dramaboxdb.com/drama-box";

/// DramaBox Gateway
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Token source URL, tried in order (repeat or comma-separate for fallbacks)
    #[arg(
        short = 't',
        long = "token-source",
        env = "TOKEN_SOURCES",
        value_delimiter = ',',
        default_value = DEFAULT_TOKEN_SOURCE
    )]
    pub token_sources: Vec<String>,

    /// Token cache lifetime in seconds (tokens are valid ~24h)
    #[arg(long, env = "TOKEN_CACHE_TTL", default_value = "82800")]
    pub token_ttl: u64,

    /// Token source request timeout in seconds
    #[arg(long, env = "TOKEN_FETCH_TIMEOUT", default_value = "10")]
    pub token_timeout: u64,

    /// DramaBox API base URL
    #[arg(long, env = "DRAMABOX_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "15")]
    pub http_timeout: u64,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "10")]
    pub http_connect_timeout: u64,

    /// Retries after the upstream rejects the token
    #[arg(long, env = "HTTP_MAX_RETRIES", default_value = "2")]
    pub http_retries: u32,

    /// Channel used by /api/latest when none is given
    #[arg(long, env = "DEFAULT_CHANNEL_ID", default_value = "43")]
    pub default_channel: i64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Token sources
    pub token_sources: Vec<String>,
    pub token_ttl: Duration,
    pub token_fetch_timeout: Duration,

    // DramaBox API
    pub api_base_url: String,
    pub http_connect_timeout: Duration,
    pub http_request_timeout: Duration,
    pub http_max_retries: u32,
    pub default_channel_id: i64,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Self::from_args(CliArgs::parse()))
    }

    /// Build configuration from parsed arguments
    pub fn from_args(args: CliArgs) -> Self {
        Config {
            server_host: args.host,
            server_port: args.port,

            token_sources: args
                .token_sources
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            token_ttl: Duration::from_secs(args.token_ttl),
            token_fetch_timeout: Duration::from_secs(args.token_timeout),

            api_base_url: args.api_base_url,
            http_connect_timeout: Duration::from_secs(args.http_connect_timeout),
            http_request_timeout: Duration::from_secs(args.http_timeout),
            http_max_retries: args.http_retries,
            default_channel_id: args.default_channel,

            log_level: args.log_level,
            log_json: args.log_json,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.token_sources.is_empty() {
            anyhow::bail!("At least one token source is required (use -t or set TOKEN_SOURCES)");
        }

        for source in &self.token_sources {
            reqwest::Url::parse(source)
                .with_context(|| format!("Invalid token source URL: {}", source))?;
        }

        reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid DRAMABOX_BASE_URL: {}", self.api_base_url))?;

        if self.token_ttl.is_zero() {
            anyhow::bail!("TOKEN_CACHE_TTL must be greater than zero");
        }

        if self.token_fetch_timeout.is_zero()
            || self.http_request_timeout.is_zero()
            || self.http_connect_timeout.is_zero()
        {
            anyhow::bail!("Request timeouts must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let argv = std::iter::once("dramabox-gateway").chain(args.iter().copied());
        Config::from_args(CliArgs::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.token_sources, vec![DEFAULT_TOKEN_SOURCE.to_string()]);
        assert_eq!(config.token_ttl, Duration::from_secs(23 * 60 * 60));
        assert_eq!(config.token_fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.http_request_timeout, Duration::from_secs(15));
        assert_eq!(config.http_max_retries, 2);
        assert_eq!(config.default_channel_id, 43);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_multiple_token_sources() {
        let config = parse(&["-t", "https://a.example/token, https://b.example/token"]);
        assert_eq!(
            config.token_sources,
            vec![
                "https://a.example/token".to_string(),
                "https://b.example/token".to_string()
            ]
        );

        let config = parse(&[
            "--token-source",
            "https://a.example/token",
            "--token-source",
            "https://c.example/token",
        ]);
        assert_eq!(config.token_sources.len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_sources() {
        let mut config = parse(&[]);
        config.token_sources = vec![];
        assert!(config.validate().is_err());

        config.token_sources = vec!["not a url".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let config = parse(&["--token-ttl", "0"]);
        assert!(config.validate().is_err());

        let config = parse(&["--http-timeout", "0"]);
        assert!(config.validate().is_err());

        let config = parse(&["--http-connect-timeout", "0"]);
        assert!(config.validate().is_err());

        let config = parse(&["--token-timeout", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_sources_are_dropped() {
        let config = parse(&["-t", "https://a.example/token,,"]);
        assert_eq!(config.token_sources, vec!["https://a.example/token".to_string()]);
    }
}
