//! 错误类型
//!
//! 按关注点拆分：配置、台账、登录、浏览器。
//! 能力层（driver / provider / probe）统一使用 `anyhow::Result`，
//! 只有会终止整次运行的错误才会被提升为这里的具体类型。

use std::path::PathBuf;

/// 应用程序错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 申请台账错误
    #[error("台账错误: {0}")]
    Ledger(#[from] LedgerError),
    /// 登录错误
    #[error("登录错误: {0}")]
    Auth(#[from] AuthError),
    /// 目标平台不可达
    #[error("目标平台不可达: {url}")]
    Unreachable { url: String },
}

/// 浏览器相关错误
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
}

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 未配置搜索关键词
    #[error("未配置任何搜索关键词")]
    MissingKeywords,
    /// 未配置搜索地点
    #[error("未配置任何搜索地点")]
    MissingLocations,
    /// 未配置登录凭据
    #[error("未配置登录凭据 (LOGIN_EMAIL / LOGIN_PASSWORD)")]
    MissingCredentials,
    /// 配置项取值非法
    #[error("配置项 {field} 取值非法: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// 申请台账错误
///
/// 台账缺失或为空不是错误；只有读写失败和内容损坏会出现在这里。
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// 文件读写失败
    #[error("台账文件读写失败 ({path}): {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// CSV 写入失败
    #[error("台账写入失败 ({path}): {source}")]
    Write { path: PathBuf, source: csv::Error },
    /// 台账内容损坏
    #[error("台账已损坏 ({path} 第 {line} 行): {reason}")]
    Corrupt {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

/// 登录错误
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 登录表单元素缺失
    #[error("未找到登录表单元素: {0}")]
    FieldNotFound(&'static str),
    /// 登录后校验失败（仍停留在登录页或遇到验证挑战）
    #[error("登录校验失败，当前页面: {url}")]
    VerificationFailed { url: String },
    /// 驱动异常
    #[error("驱动异常: {0}")]
    Driver(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建浏览器启动错误
    pub fn browser_launch_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(source),
        })
    }
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LedgerError::Io {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
