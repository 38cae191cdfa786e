use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub providers: ProviderConfig,
    pub moderation: ModerationConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            providers: ProviderConfig::from_env()?,
            moderation: ModerationConfig::from_env()?,
            storage: StorageConfig {
                seed_path: optional_var("SEED_DATA_PATH").map(PathBuf::from),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which chat backend answers the listing assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantProvider {
    Groq,
    OpenAi,
    Gemini,
}

impl AssistantProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(ConfigError::InvalidProvider(other.to_string())),
        }
    }
}

/// Credentials and model selection for the third-party APIs.
///
/// Keys stay optional here; a handler that needs a missing key reports it
/// through [`ProviderConfig::require`] at request time.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_vision_model: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub assistant_provider: AssistantProvider,
    pub stripe_secret_key: Option<String>,
    pub stripe_currency: String,
    /// Largest payment intent accepted, in major currency units.
    pub max_payment_amount: f64,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber("PROVIDER_TIMEOUT_SECS"))?;

        let max_payment_amount = env::var("MAX_PAYMENT_AMOUNT")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(ConfigError::InvalidNumber("MAX_PAYMENT_AMOUNT"))?;

        let assistant_provider = match optional_var("ASSISTANT_PROVIDER") {
            Some(value) => AssistantProvider::parse(&value)?,
            None => AssistantProvider::Groq,
        };

        Ok(Self {
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: var_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_vision_model: var_or("OPENAI_VISION_MODEL", "gpt-4o"),
            groq_api_key: optional_var("GROQ_API_KEY"),
            groq_model: var_or("GROQ_MODEL", "llama-3.3-70b-versatile"),
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            gemini_model: var_or("GEMINI_MODEL", "gemini-2.0-flash"),
            assistant_provider,
            stripe_secret_key: optional_var("STRIPE_SECRET_KEY"),
            stripe_currency: var_or("STRIPE_CURRENCY", "usd").to_ascii_lowercase(),
            max_payment_amount,
            resend_api_key: optional_var("RESEND_API_KEY"),
            email_from: var_or("EMAIL_FROM", "Charity Market <noreply@charity.market>"),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Returns the key or a configuration error naming the missing variable.
    pub fn require<'a>(
        key: &'a Option<String>,
        variable: &'static str,
    ) -> Result<&'a str, ConfigError> {
        key.as_deref().ok_or(ConfigError::MissingVar(variable))
    }
}

/// Moderation gate and pricing fallback settings.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Replaces the built-in denylist when set.
    pub denylist_override: Option<Vec<String>>,
    pub fallback_price: f64,
}

impl ModerationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let denylist_override = match optional_var("MODERATION_DENYLIST") {
            Some(raw) => {
                let terms = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                if terms.is_empty() {
                    return Err(ConfigError::EmptyDenylist);
                }
                Some(terms)
            }
            None => None,
        };

        let fallback_price = env::var("PRICING_FALLBACK_PRICE")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price > 0.0)
            .ok_or(ConfigError::InvalidNumber("PRICING_FALLBACK_PRICE"))?;

        Ok(Self {
            denylist_override,
            fallback_price,
        })
    }
}

/// Where the in-memory stores get their rows from at startup.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// JSON file with submissions, orders, and email preferences.
    pub seed_path: Option<PathBuf>,
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    optional_var(name).unwrap_or_else(|| default.to_string())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidProvider(String),
    InvalidNumber(&'static str),
    MissingVar(&'static str),
    EmptyDenylist,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidProvider(value) => write!(
                f,
                "ASSISTANT_PROVIDER must be one of groq, openai, gemini (found '{value}')"
            ),
            ConfigError::InvalidNumber(variable) => {
                write!(f, "{variable} must be a positive number")
            }
            ConfigError::MissingVar(variable) => write!(f, "{variable} is not configured"),
            ConfigError::EmptyDenylist => {
                write!(f, "MODERATION_DENYLIST must name at least one term")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
