use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub gemini: GeminiConfig,
    pub geocoding: GeocodingConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Gemini vision inference settings
#[derive(Clone)]
pub struct GeminiConfig {
    /// Secret API key, the only required setting
    pub api_key: String,
    pub model: String,
    /// REST base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    pub base_url: String,
}

/// Nominatim geocoding settings
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent
    pub user_agent: String,
    /// Appended to every query after the extracted address and region
    pub region_suffix: String,
    /// Bounded wait for a single lookup
    pub timeout: Duration,
    /// Pause after every lookup, whatever its outcome
    pub courtesy_pause: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            gemini: GeminiConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GeminiConfig {
    const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "GEMINI_API_KEY environment variable is required".to_string())?;

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        let base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            model,
            base_url,
        })
    }
}

// Keeps the API key out of startup logs
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeocodingConfig {
    const DEFAULT_BASE_URL: &'static str = "https://nominatim.openstreetmap.org";
    const DEFAULT_USER_AGENT: &'static str = "PUPR Papua Tengah Data Akuntabilitas System Demo";
    const DEFAULT_REGION_SUFFIX: &'static str = "Papua Tengah";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_PAUSE_MILLIS: u64 = 1500;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("NOMINATIM_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let user_agent = env::var("NOMINATIM_USER_AGENT")
            .unwrap_or_else(|_| Self::DEFAULT_USER_AGENT.to_string());

        let region_suffix = env::var("GEOCODING_REGION_SUFFIX")
            .unwrap_or_else(|_| Self::DEFAULT_REGION_SUFFIX.to_string());

        let timeout_secs = env::var("GEOCODING_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "GEOCODING_TIMEOUT_SECS must be a valid number".to_string())?;

        let pause_millis = env::var("GEOCODING_PAUSE_MILLIS")
            .unwrap_or_else(|_| Self::DEFAULT_PAUSE_MILLIS.to_string())
            .parse::<u64>()
            .map_err(|_| "GEOCODING_PAUSE_MILLIS must be a valid number".to_string())?;

        Ok(Self {
            base_url,
            user_agent,
            region_suffix,
            timeout: Duration::from_secs(timeout_secs),
            courtesy_pause: Duration::from_millis(pause_millis),
        })
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            region_suffix: Self::DEFAULT_REGION_SUFFIX.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            courtesy_pause: Duration::from_millis(Self::DEFAULT_PAUSE_MILLIS),
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "KTP Geo-Verification API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Ekstraksi data KTP dengan Gemini dan validasi koordinat dengan Nominatim".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocoding_defaults() {
        let config = GeocodingConfig::default();
        assert_eq!(config.region_suffix, "Papua Tengah");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.courtesy_pause, Duration::from_millis(1500));
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut config = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(config.credentials(), None);

        config.password = Some("secret".to_string());
        assert_eq!(config.credentials(), Some("admin:secret".to_string()));
    }

    #[test]
    fn test_gemini_config_debug_hides_key() {
        let config = GeminiConfig {
            api_key: "super-secret".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "http://localhost".to_string(),
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("gemini-2.5-flash"));
    }
}
