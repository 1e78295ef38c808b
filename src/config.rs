use serde::Deserialize;

/// Upstream lookup API used when `LOOKUP_BASE_URL` is not set.
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://world-ecletix.onrender.com/api";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub lookup_base_url: String,
    pub webhook_url: Option<String>, // None disables notifications
    pub webhook_username: String,
    pub phone_enrichment: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            lookup_base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            webhook_url: None,
            webhook_username: "Consultas Bot".to_string(),
            phone_enrichment: true,
            rate_limit_per_second: 5,
            rate_limit_burst: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            lookup_base_url: std::env::var("LOOKUP_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| validate_http_url("LOOKUP_BASE_URL", &url))
                .transpose()?
                .unwrap_or(defaults.lookup_base_url),
            webhook_url: std::env::var("WEBHOOK_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| validate_http_url("WEBHOOK_URL", &url))
                .transpose()?,
            webhook_username: std::env::var("WEBHOOK_USERNAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.webhook_username),
            phone_enrichment: match std::env::var("PHONE_ENRICHMENT") {
                Ok(value) => parse_flag(&value).ok_or_else(|| {
                    anyhow::anyhow!("PHONE_ENRICHMENT must be true/false/1/0, got '{}'", value)
                })?,
                Err(_) => defaults.phone_enrichment,
            },
            rate_limit_per_second: std::env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| defaults.rate_limit_per_second.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a positive number"))
                .and_then(|n: u64| {
                    if n == 0 {
                        anyhow::bail!("RATE_LIMIT_PER_SECOND cannot be zero");
                    }
                    Ok(n)
                })?,
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| defaults.rate_limit_burst.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive number"))
                .and_then(|n: u32| {
                    if n == 0 {
                        anyhow::bail!("RATE_LIMIT_BURST cannot be zero");
                    }
                    Ok(n)
                })?,
        };

        // Log successful configuration load (without the webhook secret path)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Lookup Base URL: {}", config.lookup_base_url);
        match config.webhook_url {
            Some(ref url) => tracing::info!("Webhook configured: {}", redact_url(url)),
            None => tracing::warn!("WEBHOOK_URL not set, lookup notifications disabled"),
        }
        tracing::debug!("Phone enrichment: {}", config.phone_enrichment);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn validate_http_url(name: &str, raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Keeps scheme and host only; webhook paths embed their token.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => format!(
            "{}://{}/[REDACTED]",
            parsed.scheme(),
            parsed.host_str().unwrap_or("?")
        ),
        Err(_) => "[REDACTED]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_url() {
        assert_eq!(
            validate_http_url("X", "https://example.com/api/").unwrap(),
            "https://example.com/api"
        );
        assert!(validate_http_url("X", "ftp://example.com").is_err());
        assert!(validate_http_url("X", "not a url").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_redact_url_hides_token() {
        let redacted = redact_url("https://discord.com/api/webhooks/123/secret-token");
        assert_eq!(redacted, "https://discord.com/[REDACTED]");
        assert!(!redacted.contains("secret"));
    }
}
