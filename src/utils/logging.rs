/// 日志工具模块
///
/// 负责初始化 tracing（终端 + 文件两路输出），并提供日志格式化辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::Config;

/// 初始化日志系统
///
/// 终端输出受 `RUST_LOG` 控制（默认 info，`verbose_logging` 时为 debug），
/// 文件始终记录 debug 及以上级别。
///
/// # 返回
/// 返回本次运行的日志文件路径
pub fn init(config: &Config) -> Result<PathBuf> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("无法创建日志目录: {}", config.log_dir.display()))?;

    let log_path = config.log_dir.join(format!(
        "job_pilot_{}.log",
        chrono::Local::now().format("%Y%m%d")
    ));
    init_log_file(&log_path)?;

    let file = OpenOptions::new()
        .append(true)
        .open(&log_path)
        .with_context(|| format!("无法打开日志文件: {}", log_path.display()))?;

    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_target(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("日志系统已初始化")?;

    Ok(log_path)
}

/// 写入日志文件头（追加模式，同一天多次运行共用一个文件）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &Path) -> Result<()> {
    let log_header = format!(
        "{}\n自动投递日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法创建日志文件: {}", log_file_path.display()))?;
    file.write_all(log_header.as_bytes())?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动投递模式");
    info!("🔎 关键词: {}", config.keywords.join(", "));
    info!("📍 地点: {}", config.locations.join(", "));
    info!("📊 每日上限: {}", config.daily_limit);
    info!(
        "🎯 相似度阈值: {:.2} / 优先级阈值: {:.2}",
        config.similarity_threshold, config.priority_threshold
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
