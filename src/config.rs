use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    pub image_dir: String,
    pub hidden_image_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between prize broadcasts.
    pub drop_interval_secs: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    25
}

fn default_max_connections() -> u32 {
    10
}

impl Default for AssetsConfig {
    fn default() -> Self {
        AssetsConfig {
            image_dir: "img".to_string(),
            hidden_image_dir: "hidden_img".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            drop_interval_secs: 3600,
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str)
                    .map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build from environment variables and defaults
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let bot_token = get_env("TELEGRAM_BOT_TOKEN")
                    .ok_or("Missing TELEGRAM_BOT_TOKEN env var and no config.toml found")?;
                let database_url = get_env("DATABASE_URL")
                    .ok_or("Missing DATABASE_URL env var and no config.toml found")?;

                Config {
                    telegram: TelegramConfig {
                        bot_token,
                        api_url: get_env("TELEGRAM_API_URL").unwrap_or_else(default_api_url),
                        poll_timeout_secs: get_env_parse(
                            "TELEGRAM_POLL_TIMEOUT",
                            default_poll_timeout(),
                        ),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse(
                            "DB_MAX_CONNECTIONS",
                            default_max_connections(),
                        ),
                    },
                    assets: AssetsConfig {
                        image_dir: get_env("IMAGE_DIR").unwrap_or_else(|| "img".to_string()),
                        hidden_image_dir: get_env("HIDDEN_IMAGE_DIR")
                            .unwrap_or_else(|| "hidden_img".to_string()),
                    },
                    scheduler: SchedulerConfig {
                        drop_interval_secs: get_env_parse("DROP_INTERVAL_SECS", 3600u64),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Env overrides (applied even when the file exists)
        if let Ok(v) = env::var("TELEGRAM_BOT_TOKEN") {
            config.telegram.bot_token = v;
        }
        if let Ok(v) = env::var("TELEGRAM_API_URL") {
            config.telegram.api_url = v;
        }
        if let Ok(v) = env::var("TELEGRAM_POLL_TIMEOUT")
            && let Ok(n) = v.parse()
        {
            config.telegram.poll_timeout_secs = n;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("IMAGE_DIR") {
            config.assets.image_dir = v;
        }
        if let Ok(v) = env::var("HIDDEN_IMAGE_DIR") {
            config.assets.hidden_image_dir = v;
        }
        if let Ok(v) = env::var("DROP_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            config.scheduler.drop_interval_secs = n;
        }

        Ok(config)
    }
}
