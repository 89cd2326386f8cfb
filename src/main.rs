use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use apply_orchestrator::browser::ChromiumLauncher;
use apply_orchestrator::config::Config;
use apply_orchestrator::models::load_profile;
use apply_orchestrator::orchestrator::OrchestrationController;
use apply_orchestrator::services::{FitScorer, HttpJobSearch, HttpProbe};
use apply_orchestrator::utils::logging;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("❌ 程序异常退出: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<bool> {
    // .env 不存在不是错误
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    let log_path = logging::init(&config)?;
    logging::log_startup(&config);
    info!("📝 日志文件: {}", log_path.display());

    let profile = load_profile(&config.profile_path).await?;

    let scorer = FitScorer::new(config.similarity_threshold);
    let search = Arc::new(HttpJobSearch::new(&config)?);
    let probe = Arc::new(HttpProbe::new(Duration::from_secs(10))?);
    let launcher = ChromiumLauncher::new(config.browser.clone());

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    let mut controller =
        OrchestrationController::new(config, profile, scorer, search, probe, launcher);
    let report = controller.run(&cancel).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.success)
}

/// Ctrl-C（以及 Unix 上的 SIGTERM）只翻转取消标志，当前职位处理完再停
fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        warn!("🛑 收到中断信号，处理完当前职位后停止...");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!("⚠️ 无法监听 SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
