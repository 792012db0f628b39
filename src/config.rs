use std::env;
use std::net::SocketAddr;

#[derive(Clone)]
pub struct Config {
    // Telegram bot
    pub bot_token: String,
    pub use_test_api: bool,

    // Redis
    pub redis_url: String,

    // Server
    pub bind_addr: SocketAddr,

    // CORS origin of the Mini App front-end
    pub frontend_url: String,

    // Shared secret protecting the webhook registration endpoint
    pub init_secret: String,

    // Auth policy
    pub auth_freshness_secs: i64,
    pub token_ttl_secs: u64,

    // Calendar submissions
    pub calendar_ref_len: usize,
    pub max_dates_per_calendar: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"[REDACTED]")
            .field("use_test_api", &self.use_test_api)
            .field("redis_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("frontend_url", &self.frontend_url)
            .field("init_secret", &"[REDACTED]")
            .field("auth_freshness_secs", &self.auth_freshness_secs)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("calendar_ref_len", &self.calendar_ref_len)
            .field("max_dates_per_calendar", &self.max_dates_per_calendar)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        // Bot token is the HMAC shared secret; required and non-empty
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingVar("TELEGRAM_BOT_TOKEN".to_string()))?;
        if bot_token.is_empty() {
            return Err(ConfigError::InvalidValue(
                "TELEGRAM_BOT_TOKEN".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        let use_test_api = parse_env_or_default("TELEGRAM_USE_TEST_API", false)?;

        // Redis — required to prevent silent unauthenticated connections
        let redis_url =
            env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        // Only the Mini App origin may make cross-origin requests
        let frontend_url = env::var("FRONTEND_URL")
            .map_err(|_| ConfigError::MissingVar("FRONTEND_URL".to_string()))?;

        let init_secret = env::var("INIT_SECRET")
            .map_err(|_| ConfigError::MissingVar("INIT_SECRET".to_string()))?;
        if init_secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "INIT_SECRET".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        // Auth policy
        let auth_freshness_secs = parse_env_or_default("AUTH_FRESHNESS_SECS", 600)?;
        let token_ttl_secs = parse_env_or_default("TOKEN_TTL_SECS", 86_400)?;

        // Calendar submissions
        let calendar_ref_len = parse_env_or_default("CALENDAR_REF_LEN", 8)?;
        if calendar_ref_len < 6 {
            return Err(ConfigError::InvalidValue(
                "CALENDAR_REF_LEN".to_string(),
                "must be at least 6 characters".to_string(),
            ));
        }
        let max_dates_per_calendar = parse_env_or_default("MAX_DATES_PER_CALENDAR", 100)?;

        Ok(Config {
            bot_token,
            use_test_api,
            redis_url,
            bind_addr,
            frontend_url,
            init_secret,
            auth_freshness_secs,
            token_ttl_secs,
            calendar_ref_len,
            max_dates_per_calendar,
        })
    }
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Use a mutex to ensure tests run serially since they modify global env vars.
    // unwrap_or_else handles poison from prior panics.
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn lock_test() -> std::sync::MutexGuard<'static, ()> {
        TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_test_env() {
        env::remove_var("TELEGRAM_BOT_TOKEN");
        env::remove_var("TELEGRAM_USE_TEST_API");
        env::remove_var("REDIS_URL");
        env::remove_var("BIND_ADDR");
        env::remove_var("FRONTEND_URL");
        env::remove_var("INIT_SECRET");
        env::remove_var("AUTH_FRESHNESS_SECS");
        env::remove_var("TOKEN_TTL_SECS");
        env::remove_var("CALENDAR_REF_LEN");
        env::remove_var("MAX_DATES_PER_CALENDAR");
    }

    fn set_required_env() {
        env::set_var("TELEGRAM_BOT_TOKEN", "12345:test-token");
        env::set_var("REDIS_URL", "redis://127.0.0.1:6379");
        env::set_var("FRONTEND_URL", "https://app.example.com");
        env::set_var("INIT_SECRET", "init-secret");
    }

    #[test]
    fn test_parse_env_or_default() {
        let _guard = lock_test();

        env::set_var("TEST_U64", "12345");
        let result: Result<u64, ConfigError> = parse_env_or_default("TEST_U64", 100);
        assert_eq!(result.unwrap(), 12345);

        env::remove_var("TEST_U64");
        let result: Result<u64, ConfigError> = parse_env_or_default("TEST_U64", 100);
        assert_eq!(result.unwrap(), 100);
    }

    #[test]
    fn test_missing_bot_token() {
        let _guard = lock_test();
        clear_test_env();

        // Set to empty to prevent dotenvy from reloading a valid token from
        // .env (dotenvy doesn't override existing vars). This triggers the
        // "cannot be empty" check in from_env().
        env::set_var("TELEGRAM_BOT_TOKEN", "");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "TELEGRAM_BOT_TOKEN"
        ));

        clear_test_env();
    }

    #[test]
    fn test_invalid_socket_addr() {
        let _guard = lock_test();
        clear_test_env();

        set_required_env();
        env::set_var("BIND_ADDR", "invalid_address");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_, _)));

        clear_test_env();
    }

    #[test]
    fn test_calendar_ref_len_minimum() {
        let _guard = lock_test();
        clear_test_env();

        set_required_env();
        env::set_var("CALENDAR_REF_LEN", "4");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "CALENDAR_REF_LEN"
        ));

        clear_test_env();
    }

    #[test]
    fn test_config_defaults() {
        let _guard = lock_test();
        clear_test_env();

        set_required_env();
        env::set_var("BIND_ADDR", "0.0.0.0:3000");

        let config = Config::from_env().unwrap();

        assert_eq!(config.bot_token, "12345:test-token");
        assert!(!config.use_test_api);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.frontend_url, "https://app.example.com");
        assert_eq!(config.auth_freshness_secs, 600);
        assert_eq!(config.token_ttl_secs, 86_400);
        assert_eq!(config.calendar_ref_len, 8);
        assert_eq!(config.max_dates_per_calendar, 100);

        clear_test_env();
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let _guard = lock_test();
        clear_test_env();

        set_required_env();
        let config = Config::from_env().unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("12345:test-token"));
        assert!(!debug.contains("init-secret"));
        assert!(!debug.contains("redis://"));
        assert!(debug.contains("[REDACTED]"));

        clear_test_env();
    }
}
