use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult, BrowserError};

/// 连接到已在调试端口上运行的浏览器，并为本次会话新建一个空白页面
///
/// 已有的标签页保持不动，会话结束时只关闭这里创建的页面。
pub async fn connect_to_browser(port: u16) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("🔗 正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

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

    if let Ok(pages) = browser.pages().await {
        debug!("浏览器中已有 {} 个页面", pages.len());
    }

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("创建空白页面失败: {}", e);
            handle.abort();
            return Err(BrowserError::PageCreationFailed {
                source: Box::new(e),
            }
            .into());
        }
    };

    Ok((browser, page, handle))
}
