//! 程序配置
//!
//! 加载顺序：内置默认值 → TOML 配置文件（可选）→ 环境变量覆盖。
//! `.env` 文件由 `main` 在加载配置前通过 dotenvy 注入环境。

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::utils::pacing::HumanPacing;

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "JOB_PILOT_CONFIG";
/// 未指定时尝试读取的默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 搜索 ---
    /// 搜索关键词
    pub keywords: Vec<String>,
    /// 搜索地点
    pub locations: Vec<String>,
    /// 每次搜索最多返回的职位数
    pub max_results_per_search: usize,
    /// 只搜索最近 N 小时发布的职位
    pub recency_hours: u32,
    /// 只保留支持快速申请的职位
    pub easy_apply_only: bool,

    // --- 配额与节奏 ---
    /// 每日申请上限
    pub daily_limit: usize,
    /// 两次申请之间的间隔（秒）
    pub inter_application_delay_seconds: u64,
    /// 两次搜索调用之间的随机间隔下限（秒）
    pub discovery_delay_min_seconds: u64,
    /// 两次搜索调用之间的随机间隔上限（秒）
    pub discovery_delay_max_seconds: u64,
    /// 单次搜索调用超时（秒）
    pub search_timeout_seconds: u64,
    /// 单个申请的整体超时（秒）
    pub submission_timeout_seconds: u64,

    // --- 评分 ---
    /// 相似度阈值，`should_apply` 的判定依据
    pub similarity_threshold: f64,
    /// 优先级阈值，进入申请队列的判定依据
    pub priority_threshold: f64,

    // --- 表单 ---
    /// 表单最大步数
    pub max_form_steps: usize,
    /// 查找申请入口的超时（毫秒）
    pub apply_lookup_timeout_ms: u64,
    /// 查找“下一步/提交”按钮的超时（毫秒）
    pub proceed_lookup_timeout_ms: u64,
    /// 查找完成标识的超时（毫秒）
    pub completion_lookup_timeout_ms: u64,
    /// 查找表单字段的超时（毫秒）
    pub field_lookup_timeout_ms: u64,
    /// 模拟人工操作的节奏
    pub pacing: HumanPacing,

    // --- 平台 ---
    /// 写入台账的平台名
    pub platform_name: String,
    /// 平台首页（连通性检查）
    pub platform_url: String,
    /// 登录页
    pub login_url: String,
    /// 职位搜索接口
    pub search_endpoint: String,
    /// 登录凭据
    pub credentials: Credentials,

    // --- 文件 ---
    /// 申请台账路径
    pub ledger_path: PathBuf,
    /// 候选人资料路径
    pub profile_path: PathBuf,
    /// 日志目录
    pub log_dir: PathBuf,
    /// 搜索结束后把职位导出为 CSV 供人工查看
    pub export_discovered: bool,
    /// 导出目录
    pub export_dir: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,

    // --- 浏览器 ---
    pub browser: BrowserSettings,
}

/// 登录凭据
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// 密码永远不进日志
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// 浏览器设置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// 无头模式
    pub headless: bool,
    /// 连接已打开浏览器的调试端口；为空时自行启动浏览器
    pub debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            debug_port: None,
            chrome_executable: None,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: vec![
                "Economist".to_string(),
                "Economic Analyst".to_string(),
                "Policy Analyst".to_string(),
                "Research Analyst".to_string(),
                "Data Analyst".to_string(),
                "Quantitative Analyst".to_string(),
            ],
            locations: vec!["London".to_string(), "Remote".to_string()],
            max_results_per_search: 150,
            recency_hours: 24,
            easy_apply_only: true,
            daily_limit: 50,
            inter_application_delay_seconds: 30,
            discovery_delay_min_seconds: 3,
            discovery_delay_max_seconds: 7,
            search_timeout_seconds: 60,
            submission_timeout_seconds: 300,
            similarity_threshold: 0.6,
            priority_threshold: 0.6,
            max_form_steps: 5,
            apply_lookup_timeout_ms: 5000,
            proceed_lookup_timeout_ms: 3000,
            completion_lookup_timeout_ms: 2000,
            field_lookup_timeout_ms: 2000,
            pacing: HumanPacing::default(),
            platform_name: "LinkedIn".to_string(),
            platform_url: "https://www.linkedin.com".to_string(),
            login_url: "https://www.linkedin.com/login".to_string(),
            search_endpoint: "http://localhost:8000/jobs".to_string(),
            credentials: Credentials::default(),
            ledger_path: PathBuf::from("data/applications.csv"),
            profile_path: PathBuf::from("config/profile.toml"),
            log_dir: PathBuf::from("data/logs"),
            export_discovered: false,
            export_dir: PathBuf::from("data"),
            verbose_logging: false,
            browser: BrowserSettings::default(),
        }
    }
}

impl Config {
    /// 加载配置：配置文件（如存在）叠加环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        base.with_overrides(|name| std::env::var(name).ok())
    }

    /// 仅从环境变量加载（其余取默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件加载，缺省字段取默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 用外部变量覆盖配置
    ///
    /// `lookup` 按变量名返回取值；未设置的变量保持原值。
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("KEYWORDS") {
            self.keywords = split_list(&v);
        }
        if let Some(v) = get("LOCATIONS") {
            self.locations = split_list(&v);
        }
        if let Some(v) = get("MAX_APPLICATIONS_PER_DAY") {
            self.daily_limit = parse_var("MAX_APPLICATIONS_PER_DAY", &v, "usize")?;
        }
        if let Some(v) = get("DELAY_BETWEEN_APPLICATIONS") {
            self.inter_application_delay_seconds =
                parse_var("DELAY_BETWEEN_APPLICATIONS", &v, "u64")?;
        }
        if let Some(v) = get("SIMILARITY_THRESHOLD") {
            self.similarity_threshold = parse_var("SIMILARITY_THRESHOLD", &v, "f64")?;
        }
        if let Some(v) = get("PRIORITY_THRESHOLD") {
            self.priority_threshold = parse_var("PRIORITY_THRESHOLD", &v, "f64")?;
        }
        if let Some(v) = get("EASY_APPLY_ONLY") {
            self.easy_apply_only = parse_var("EASY_APPLY_ONLY", &v, "bool")?;
        }
        if let Some(v) = get("LOGIN_EMAIL") {
            self.credentials.email = v;
        }
        if let Some(v) = get("LOGIN_PASSWORD") {
            self.credentials.password = v;
        }
        if let Some(v) = get("HEADLESS_MODE") {
            self.browser.headless = parse_var("HEADLESS_MODE", &v, "bool")?;
        }
        if let Some(v) = get("BROWSER_DEBUG_PORT") {
            self.browser.debug_port = Some(parse_var("BROWSER_DEBUG_PORT", &v, "u16")?);
        }
        if let Some(v) = get("CHROME_EXECUTABLE") {
            self.browser.chrome_executable = Some(PathBuf::from(v));
        }
        if let Some(v) = get("LEDGER_PATH") {
            self.ledger_path = PathBuf::from(v);
        }
        if let Some(v) = get("PROFILE_PATH") {
            self.profile_path = PathBuf::from(v);
        }
        if let Some(v) = get("LOG_DIR") {
            self.log_dir = PathBuf::from(v);
        }
        if let Some(v) = get("EXPORT_DISCOVERED") {
            self.export_discovered = parse_var("EXPORT_DISCOVERED", &v, "bool")?;
        }
        if let Some(v) = get("EXPORT_DIR") {
            self.export_dir = PathBuf::from(v);
        }
        if let Some(v) = get("SEARCH_ENDPOINT") {
            self.search_endpoint = v;
        }
        if let Some(v) = get("PLATFORM_URL") {
            self.platform_url = v;
        }
        if let Some(v) = get("LOGIN_URL") {
            self.login_url = v;
        }
        if let Some(v) = get("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", &v, "bool")?;
        }

        Ok(self)
    }

    /// 运行前校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::MissingKeywords);
        }
        if self.locations.iter().all(|l| l.trim().is_empty()) {
            return Err(ConfigError::MissingLocations);
        }
        if !self.credentials.is_complete() {
            return Err(ConfigError::MissingCredentials);
        }
        for (field, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("priority_threshold", self.priority_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{} 不在 [0, 1] 区间内", value),
                });
            }
        }
        if self.max_form_steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_form_steps",
                reason: "至少为 1".to_string(),
            });
        }
        if self.discovery_delay_min_seconds > self.discovery_delay_max_seconds {
            return Err(ConfigError::InvalidValue {
                field: "discovery_delay_min_seconds",
                reason: "不能大于 discovery_delay_max_seconds".to_string(),
            });
        }
        Ok(())
    }

    pub fn inter_application_delay(&self) -> Duration {
        Duration::from_secs(self.inter_application_delay_seconds)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_seconds)
    }

    pub fn submission_timeout(&self) -> Duration {
        Duration::from_secs(self.submission_timeout_seconds)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T: FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type,
        })
}
