use std::fmt;

pub const DEFAULT_API_VERSION: &str = "v18";
pub const DEFAULT_ENDPOINT: &str = "https://googleads.googleapis.com";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub developer_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Manager account used as `login-customer-id`, digits only.
    pub login_customer_id: Option<String>,
    /// Client-library message encoding toggle, accepted for parity with
    /// existing deployments.
    pub use_proto_plus: bool,
    pub api_version: String,
    pub endpoint: String,
    pub token_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("developer_token", &"[redacted]")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("login_customer_id", &self.login_customer_id)
            .field("use_proto_plus", &self.use_proto_plus)
            .field("api_version", &self.api_version)
            .field("endpoint", &self.endpoint)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            developer_token: required_var("GOOGLE_ADS_DEVELOPER_TOKEN")?,
            client_id: required_var("GOOGLE_ADS_CLIENT_ID")?,
            client_secret: required_var("GOOGLE_ADS_CLIENT_SECRET")?,
            refresh_token: required_var("GOOGLE_ADS_REFRESH_TOKEN")?,
            login_customer_id: std::env::var("GOOGLE_ADS_LOGIN_CUSTOMER_ID")
                .ok()
                .map(|id| id.replace('-', "").trim().to_string())
                .filter(|id| !id.is_empty()),
            use_proto_plus: std::env::var("GOOGLE_ADS_USE_PROTO_PLUS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            api_version: std::env::var("GOOGLE_ADS_API_VERSION")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            endpoint: url_var("GOOGLE_ADS_ENDPOINT", DEFAULT_ENDPOINT)?,
            token_url: url_var("GOOGLE_OAUTH_TOKEN_URL", DEFAULT_TOKEN_URL)?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Google Ads endpoint: {}", config.endpoint);
        tracing::debug!("Google Ads API version: {}", config.api_version);
        if let Some(ref login) = config.login_customer_id {
            tracing::info!("Login customer id configured: {}", login);
        }
        tracing::debug!("use_proto_plus: {}", config.use_proto_plus);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    Ok(value)
}

fn url_var(name: &str, default: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string());

    let parsed = url::Url::parse(&value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }

    Ok(value.trim_end_matches('/').to_string())
}

/// Only a case-insensitive `true` is truthy.
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
