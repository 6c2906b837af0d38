use super::*;

pub const DEFAULT_LOGIN_BASE: &str = "https://login.dominionenergy.com";
pub const DEFAULT_API_BASE: &str = "https://prodsvc-dominioncip.smartcmobile.com/Service/api/1";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ORIGIN: &str = "https://myaccount.dominionenergy.com";

// Dominion publishes new readings once a day
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 43_200;

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            login_base: DEFAULT_LOGIN_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/dominion_energy.log".to_string(),
            backup_count: 5,
            file_output: false,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: AccountConfig::default(),
            endpoints: EndpointsConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            timezone: "America/New_York".to_string(),
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
        }
    }
}
