//! CDP 驱动 - 基础设施层
//!
//! 持有唯一的 Page 资源，只暴露 [`UiDriver`] 定义的能力。
//! 不认识职位，也不处理申请流程。

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Page};
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::infrastructure::driver::UiDriver;
use crate::infrastructure::selectors::{Selector, Strategy};
use crate::utils::pacing::KeystrokePace;

/// 查找元素的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chrome 用这些消息表示节点不存在，其余错误都是驱动故障
const NOT_FOUND_MESSAGES: [&str; 3] = [
    "Could not find node with given id",
    "No node with given id",
    "Invalid search result range",
];

/// 是否只是“没找到”
fn is_not_found(error: &CdpError) -> bool {
    match error {
        CdpError::NotFound => true,
        CdpError::Chrome(e) => NOT_FOUND_MESSAGES.iter().any(|m| e.message.contains(m)),
        _ => false,
    }
}

/// 把“没找到”收敛为空结果，其余错误原样抛出
fn found_or_empty<T: Default>(result: Result<T, CdpError>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if is_not_found(&e) => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

const JS_IS_VISIBLE: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}"#;

const JS_IS_ENABLED: &str = r#"function() {
    return !this.disabled && this.getAttribute('aria-disabled') !== 'true';
}"#;

const JS_VALUE: &str = r#"function() {
    return (this.value === undefined || this.value === null) ? '' : String(this.value);
}"#;

const JS_CLEAR: &str = r#"function() {
    if ('value' in this) {
        this.value = '';
        this.dispatchEvent(new Event('input', { bubbles: true }));
    }
    return true;
}"#;

const JS_LABEL: &str = r#"function() {
    if (this.id) {
        const byFor = document.querySelector(`label[for='${CSS.escape(this.id)}']`);
        if (byFor && byFor.innerText) return byFor.innerText;
    }
    const parent = this.parentElement;
    if (parent) {
        const near = parent.querySelector('label');
        if (near && near.innerText) return near.innerText;
    }
    return this.getAttribute('placeholder') || this.getAttribute('aria-label') || '';
}"#;

/// 浏览器归属：自己启动的要关掉整个浏览器，连接上的只关自己的页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserOwnership {
    Launched,
    Attached,
}

/// Chromium 驱动
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    ownership: BrowserOwnership,
}

impl ChromiumDriver {
    /// 创建新的驱动
    pub fn new(
        browser: Browser,
        page: Page,
        handler: JoinHandle<()>,
        ownership: BrowserOwnership,
    ) -> Self {
        Self {
            browser,
            page,
            handler,
            ownership,
        }
    }

    pub fn ownership(&self) -> BrowserOwnership {
        self.ownership
    }

    /// 以元素为 `this` 调用 JS 函数，返回 JSON 结果
    async fn call_on(&self, element: &Element, function: &str) -> Result<JsonValue> {
        let returns = element.call_js_fn(function, false).await?;
        Ok(returns.result.value.unwrap_or(JsonValue::Null))
    }

    async fn lookup(&self, selector: &Selector) -> Result<Option<Element>> {
        match selector.strategy {
            Strategy::Css => found_or_empty(self.page.find_element(selector.pattern).await.map(Some))
                .with_context(|| format!("查找 {} 失败", selector)),
            // find_xpath 在零命中时会越界，取 find_xpaths 的第一个
            Strategy::XPath => Ok(self.find_all(selector).await?.into_iter().next()),
        }
    }
}

#[async_trait]
impl UiDriver for ChromiumDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    async fn find(&self, selectors: &[Selector], timeout: Duration) -> Result<Option<Element>> {
        let deadline = Instant::now() + timeout;
        loop {
            for selector in selectors {
                if let Some(element) = self.lookup(selector).await? {
                    return Ok(Some(element));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Element>> {
        let found = match selector.strategy {
            Strategy::Css => self.page.find_elements(selector.pattern).await,
            Strategy::XPath => self.page.find_xpaths(selector.pattern).await,
        };
        found_or_empty(found).with_context(|| format!("查找 {} 失败", selector))
    }

    async fn type_text(&self, element: &Element, text: &str, pace: &KeystrokePace) -> Result<()> {
        element.click().await?;
        self.call_on(element, JS_CLEAR).await?;
        for ch in text.chars() {
            element.type_str(ch.to_string()).await?;
            pace.wait().await;
        }
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.scroll_into_view().await?;
        element.click().await?;
        Ok(())
    }

    async fn is_visible(&self, element: &Element) -> Result<bool> {
        Ok(self
            .call_on(element, JS_IS_VISIBLE)
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        Ok(self
            .call_on(element, JS_IS_ENABLED)
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn value(&self, element: &Element) -> Result<String> {
        Ok(self
            .call_on(element, JS_VALUE)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn label(&self, element: &Element) -> Result<String> {
        Ok(self
            .call_on(element, JS_LABEL)
            .await?
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    async fn select_option(&self, element: &Element, containing: &str) -> Result<bool> {
        let needle = serde_json::to_string(&containing.to_lowercase())?;
        let function = format!(
            r#"function() {{
                const needle = {};
                for (const option of Array.from(this.options || [])) {{
                    if (option.text.toLowerCase().includes(needle)) {{
                        this.value = option.value;
                        this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return true;
                    }}
                }}
                return false;
            }}"#,
            needle
        );
        Ok(self
            .call_on(element, &function)
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn upload_file(&self, element: &Element, path: &Path) -> Result<()> {
        let absolute = std::fs::canonicalize(path)
            .with_context(|| format!("简历文件不存在: {}", path.display()))?;
        let params = SetFileInputFilesParams::builder()
            .file(absolute.to_string_lossy().to_string())
            .backend_node_id(element.backend_node_id.clone())
            .build()
            .map_err(|e| anyhow!("构造上传参数失败: {}", e))?;
        self.page.execute(params).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn close(self) -> Result<()> {
        let Self {
            mut browser,
            page,
            handler,
            ownership,
        } = self;

        let result = match ownership {
            BrowserOwnership::Launched => {
                debug!("关闭自行启动的浏览器");
                match browser.close().await {
                    Ok(_) => browser.wait().await.map(|_| ()).map_err(anyhow::Error::from),
                    Err(e) => Err(anyhow::Error::from(e)),
                }
            }
            BrowserOwnership::Attached => {
                debug!("关闭会话页面，保留外部浏览器");
                page.close().await.map_err(anyhow::Error::from)
            }
        };

        handler.abort();
        result.context("释放浏览器会话失败")
    }
}
