use std::fmt;

/// book_finder 的统一错误类型
#[derive(Debug)]
pub enum BookError {
    /// 搜索相关错误
    Search(SearchError),
    /// 保存（写后端）相关错误
    Save(SaveError),
    /// 本地持久化错误
    Store(StoreError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误
    Other(String),
}

/// 搜索错误
#[derive(Debug)]
pub enum SearchError {
    /// 查询为空或只含空白，本地直接拒绝，不发请求
    EmptyQuery,
    /// 网络失败或提供方返回非 2xx 状态码（网络失败时 status 为 None）
    ProviderFailure {
        status: Option<u16>,
        message: String,
    },
    /// 响应体无法解析
    InvalidResponse(String),
}

/// 保存错误
#[derive(Debug)]
pub enum SaveError {
    /// 未登录或没有 token
    Unauthenticated,
    /// 当前搜索结果中不存在该 id
    UnknownRecord(String),
    /// 写后端失败（网络错误或 mutation 被拒绝）
    WriteFailed(String),
}

/// 本地持久化错误
#[derive(Debug)]
pub enum StoreError {
    /// 读写文件失败
    IoError(String),
    /// 序列化失败
    SerializationError(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 无法识别的环境变量
    UnknownKey(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::Search(e) => write!(f, "Search Error: {}", e),
            BookError::Save(e) => write!(f, "Save Error: {}", e),
            BookError::Store(e) => write!(f, "Store Error: {}", e),
            BookError::Config(e) => write!(f, "Config Error: {}", e),
            BookError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::EmptyQuery => write!(f, "Empty search query"),
            SearchError::ProviderFailure {
                status: Some(status),
                message,
            } => write!(f, "Search provider failed (status {}): {}", status, message),
            SearchError::ProviderFailure {
                status: None,
                message,
            } => write!(f, "Search provider unreachable: {}", message),
            SearchError::InvalidResponse(msg) => write!(f, "Invalid search response: {}", msg),
        }
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Unauthenticated => write!(f, "Not logged in"),
            SaveError::UnknownRecord(id) => {
                write!(f, "Record '{}' is not in the current results", id)
            }
            SaveError::WriteFailed(cause) => write!(f, "Write failed: {}", cause),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(msg) => write!(f, "Store IO error: {}", msg),
            StoreError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::UnknownKey(key) => write!(f, "Unknown config variable: {}", key),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for BookError {}

impl std::error::Error for SearchError {}
impl std::error::Error for SaveError {}
impl std::error::Error for StoreError {}
impl std::error::Error for ConfigError {}

// From 转换实现
/// reqwest 错误只会出现在搜索路径上；写路径自行映射为 `SaveError::WriteFailed`
impl From<reqwest::Error> for BookError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timeout".to_string()
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else {
            err.to_string()
        };
        BookError::Search(SearchError::ProviderFailure {
            status: err.status().map(|s| s.as_u16()),
            message,
        })
    }
}

impl From<serde_json::Error> for BookError {
    fn from(err: serde_json::Error) -> Self {
        BookError::Store(StoreError::SerializationError(err.to_string()))
    }
}

impl From<serde_yaml::Error> for BookError {
    fn from(err: serde_yaml::Error) -> Self {
        BookError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<SearchError> for BookError {
    fn from(err: SearchError) -> Self {
        BookError::Search(err)
    }
}

impl From<SaveError> for BookError {
    fn from(err: SaveError) -> Self {
        BookError::Save(err)
    }
}

impl From<StoreError> for BookError {
    fn from(err: StoreError) -> Self {
        BookError::Store(err)
    }
}

impl From<ConfigError> for BookError {
    fn from(err: ConfigError) -> Self {
        BookError::Config(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, BookError>;
