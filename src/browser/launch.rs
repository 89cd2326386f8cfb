use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::BrowserSettings;
use crate::error::{AppError, AppResult, BrowserError};

/// 按配置构造浏览器启动参数
pub fn browser_config(settings: &BrowserSettings) -> AppResult<BrowserConfig> {
    let mut builder = BrowserConfig::builder();
    builder = if settings.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &settings.chrome_executable {
        builder = builder.chrome_executable(executable);
    }

    builder
        .window_size(settings.window_width, settings.window_height)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",              // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage",   // 防止共享内存不足
            "--disable-blink-features=AutomationControlled",
        ])
        .build()
        .map_err(|message| {
            error!("配置浏览器失败: {}", message);
            BrowserError::ConfigurationFailed { message }.into()
        })
}

/// 启动一个新的浏览器实例并打开空白页面
pub async fn launch_browser(settings: &BrowserSettings) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if settings.headless { "无头模式" } else { "有界面模式" }
    );

    let config = browser_config(settings)?;

    let (mut browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::browser_launch_failed(e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("创建页面失败: {}", e);
            // 页面都建不出来，启动的浏览器也不再需要
            if let Err(close_err) = browser.close().await {
                debug!("关闭浏览器失败: {}", close_err);
            }
            handle.abort();
            return Err(BrowserError::PageCreationFailed {
                source: Box::new(e),
            }
            .into());
        }
    };

    info!("✅ 浏览器已就绪");
    Ok((browser, page, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_builds_from_settings() {
        let settings = BrowserSettings {
            headless: true,
            chrome_executable: Some("/usr/bin/chromium".into()),
            window_width: 1280,
            window_height: 800,
            ..Default::default()
        };
        assert!(browser_config(&settings).is_ok());
    }
}
