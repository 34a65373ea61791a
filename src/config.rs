use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub shopee: ShopeeConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Partner credentials and host for the Shopee open platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopeeConfig {
    pub partner_id: String,
    pub partner_key: String,
    pub base_url: String,
    /// "sandbox" or "production"; drives bump cooldowns and refresh margins.
    #[serde(default = "default_environment")]
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How far back order discovery looks, in days.
    pub order_lookback_days: i64,
}

fn default_environment() -> String {
    "production".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            order_lookback_days: 30,
        }
    }
}

impl ShopeeConfig {
    pub fn is_sandbox(&self) -> bool {
        self.environment == "sandbox"
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Read the config file when present; otherwise build purely from env vars.
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is required when config.toml is absent")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    shopee: ShopeeConfig {
                        partner_id: get_env("SHOPEE_PARTNER_ID").unwrap_or_default(),
                        partner_key: get_env("SHOPEE_PARTNER_KEY").unwrap_or_default(),
                        base_url: get_env("SHOPEE_BASE_URL")
                            .unwrap_or_else(|| "https://partner.shopeemobile.com".to_string()),
                        environment: get_env("SHOPEE_ENVIRONMENT")
                            .unwrap_or_else(default_environment),
                    },
                    sync: SyncConfig {
                        order_lookback_days: get_env_parse("SYNC_ORDER_LOOKBACK_DAYS", 30i64),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Env vars override file values when both are present.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("SHOPEE_PARTNER_ID") {
            config.shopee.partner_id = v;
        }
        if let Ok(v) = env::var("SHOPEE_PARTNER_KEY") {
            config.shopee.partner_key = v;
        }
        if let Ok(v) = env::var("SHOPEE_BASE_URL") {
            config.shopee.base_url = v;
        }
        if let Ok(v) = env::var("SHOPEE_ENVIRONMENT") {
            config.shopee.environment = v;
        }
        if let Ok(v) = env::var("SYNC_ORDER_LOOKBACK_DAYS")
            && let Ok(n) = v.parse()
        {
            config.sync.order_lookback_days = n;
        }

        Ok(config)
    }
}
