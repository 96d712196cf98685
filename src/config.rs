use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// 可选配置文件 (不存在时忽略)
pub const CONFIG_FILE: &str = "rfq-compare";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub export: ExportConfig,
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

/// 报价匹配参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// 接受匹配的最低相似度 (得分还须 > 0)
    pub min_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub dir: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { min_score: 0.0 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/rfq_compare".to_string(),
                max_connections: 20,
            },
            matching: MatchingConfig::default(),
            export: ExportConfig {
                dir: "exports".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 加载顺序: 默认值 -> rfq-compare.toml -> RFQ__* 环境变量 -> DATABASE_URL / SERVER_HOST / SERVER_PORT
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder(Some(CONFIG_FILE))?.build()?.try_deserialize()
    }

    fn builder(
        file: Option<&str>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default("matching.min_score", defaults.matching.min_score)?
            .set_default("export.dir", defaults.export.dir)?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("RFQ")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse::<i64>().ok()),
            )
    }
}
