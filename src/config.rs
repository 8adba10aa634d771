use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub presence: PresenceConfig,
    pub redis: RedisConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Alert fan-out radius in meters.
    pub nearby_distance_m: f64,
    /// H3 resolution used by the in-memory index.
    pub h3_resolution: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sorted-set key holding driver positions.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub buffer_capacity: usize,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if tokio::fs::try_exists(path.as_ref()).await.unwrap_or(false) {
            Self::from_file(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `PORT` and `REDIS_*` overrides using `lookup` as the environment.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().with_context(|| format!("PORT={}", port))?;
        }
        if let Some(host) = lookup("REDIS_HOST") {
            self.redis.host = host;
        }
        if let Some(port) = lookup("REDIS_PORT") {
            self.redis.port = port.parse().with_context(|| format!("REDIS_PORT={}", port))?;
        }
        if let Some(username) = lookup("REDIS_USERNAME") {
            self.redis.username = username;
        }
        if let Some(password) = lookup("REDIS_PASSWORD") {
            self.redis.password = password;
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<()> {
        let radius = self.presence.nearby_distance_m;
        if !radius.is_finite() || radius < 0.0 {
            anyhow::bail!("presence.nearby_distance_m must be a non-negative number, got {}", radius);
        }
        if self.presence.h3_resolution > 15 {
            anyhow::bail!("presence.h3_resolution must be in 0..=15, got {}", self.presence.h3_resolution);
        }
        if self.logging.buffer_capacity == 0 {
            anyhow::bail!("logging.buffer_capacity must be positive");
        }
        Ok(())
    }
}

impl RedisConfig {
    /// Connection URL with the credentials percent-encoded.
    pub fn url(&self) -> String {
        let username = urlencoding::encode(&self.username);
        let password = urlencoding::encode(&self.password);
        match (self.username.is_empty(), self.password.is_empty()) {
            (true, true) => format!("redis://{}:{}/", self.host, self.port),
            (true, false) => format!("redis://:{}@{}:{}/", password, self.host, self.port),
            (false, _) => format!("redis://{}:{}@{}:{}/", username, password, self.host, self.port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            nearby_distance_m: crate::domains::presence::DEFAULT_NEARBY_DISTANCE_M,
            h3_resolution: crate::adapters::outbound::DEFAULT_H3_RESOLUTION,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            username: String::new(),
            password: String::new(),
            key: "drivers".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "driver-safety.log".to_string(),
            buffer_capacity: 1024,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            presence: PresenceConfig::default(),
            redis: RedisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
