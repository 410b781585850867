//! 配置加载
//!
//! 支持两种来源：
//! - YAML 文件：[`Config::load`]
//! - 环境变量（含 `.env`）：[`Config::from_env`]，格式：
//! ```text
//! BOOK_FINDER_SEARCH_URL=https://www.googleapis.com/books/v1/volumes
//! BOOK_FINDER_GRAPHQL_URL=http://localhost:3001/graphql
//! BOOK_FINDER_STORE_PATH=~/.book-finder/session.json
//! BOOK_FINDER_TIMEOUT_SECS=10
//! ```
//! 未设置的项使用默认值。

use crate::error::{ConfigError, Result};
use dotenv::dotenv;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:3001/graphql";
pub const DEFAULT_STORE_PATH: &str = "~/.book-finder/session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENV_PREFIX: &str = "BOOK_FINDER_";

/// 搜索提供方配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// 检索接口地址，查询词以 `?q=` 追加
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

/// 写后端配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub graphql_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
        }
    }
}

/// 本地会话快照配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// 快照文件路径，支持 `~/` 前缀
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub backend: BackendConfig,
    pub store: StoreConfig,
    /// HTTP 请求超时（秒），缺省 10
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let file =
            std::fs::File::open(path).map_err(|_| ConfigError::FileNotFound(path.to_string()))?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// 从 `(key, value)` 序列构建配置，忽略不带 `BOOK_FINDER_` 前缀的变量
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Config::default();
        for (key, value) in vars {
            let Some(suffix) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match suffix.to_lowercase().as_str() {
                "search_url" => config.search.base_url = value,
                "graphql_url" => config.backend.graphql_url = value,
                "store_path" => config.store.path = value,
                "timeout_secs" => {
                    let secs = value.trim().parse::<u64>().map_err(|e| {
                        ConfigError::InvalidValue {
                            field: key.clone(),
                            message: e.to_string(),
                        }
                    })?;
                    config.request_timeout_secs = Some(secs);
                }
                // 由命令行参数读取
                "config" | "token" => {}
                _ => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// 构建共享的 HTTP 客户端（搜索和写后端共用）
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()
            .map_err(|e| {
                ConfigError::InvalidValue {
                    field: "request_timeout_secs".to_string(),
                    message: e.to_string(),
                }
                .into()
            })
    }
}
