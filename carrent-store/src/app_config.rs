use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Backend origin; request paths start with `/api`.
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Where the signed-in session is kept between runs.
    pub path: PathBuf,
}

fn default_session_path() -> String {
    dirs::config_dir()
        .map(|dir| dir.join("carrent").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".carrent").join("session.json"))
        .to_string_lossy()
        .into_owned()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("api.base_url", "http://localhost:5000")?
            .set_default("api.timeout_ms", default_timeout_ms() as i64)?
            .set_default("session.path", default_session_path())?
            // Every file is optional; the defaults above are enough to run
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `CARRENT__API__BASE_URL=https://rent.example.com`
            .add_source(config::Environment::with_prefix("CARRENT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let config = Config::load().unwrap();

        assert!(!config.api.base_url.is_empty());
        assert!(config.api.timeout_ms > 0);
        assert!(config.session.path.ends_with("session.json"));
    }
}
