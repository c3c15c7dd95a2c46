use std::{env, path::PathBuf, time::Duration};

const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_path: PathBuf,
    pub check_in_debounce: Duration,
    pub check_out_debounce: Duration,
    pub page_size: usize,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            session_path: PathBuf::from("data/session.json"),
            check_in_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            check_out_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            page_size: DEFAULT_PAGE_SIZE,
            port: 8080,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_base_url: env::var("DESK_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            session_path: env::var("DESK_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            check_in_debounce: env_millis("DESK_CHECK_IN_DEBOUNCE_MS")
                .unwrap_or(defaults.check_in_debounce),
            check_out_debounce: env_millis("DESK_CHECK_OUT_DEBOUNCE_MS")
                .unwrap_or(defaults.check_out_debounce),
            page_size: env_parse::<usize>("DESK_PAGE_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
            port: env_parse::<u16>("PORT").unwrap_or(defaults.port),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

fn env_millis(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_millis)
}
