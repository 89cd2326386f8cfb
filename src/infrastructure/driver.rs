//! 界面自动化能力
//!
//! 流程层只通过 [`UiDriver`] 操作页面，不知道背后是 CDP 还是测试替身。
//! 会话由 [`SessionLauncher`] 创建，`close(self)` 消费会话，保证只释放一次。

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::infrastructure::selectors::{Selector, SelectorSet};
use crate::utils::pacing::KeystrokePace;

/// 页面操作能力
///
/// 查找类方法用 `Option` 表达“没找到”，`Err` 只表示驱动本身出了问题。
#[async_trait]
pub trait UiDriver: Send + Sync + Sized {
    type Element: Send + Sync;

    /// 导航到 URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// 按顺序尝试选择器，返回第一个命中的元素；超时未命中返回 None
    async fn find(&self, selectors: &[Selector], timeout: Duration)
        -> Result<Option<Self::Element>>;

    /// 返回当前页面上所有命中的元素（不等待）
    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self::Element>>;

    /// 清空后逐字输入，每个字符之间按 `pace` 随机停顿
    async fn type_text(
        &self,
        element: &Self::Element,
        text: &str,
        pace: &KeystrokePace,
    ) -> Result<()>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    /// 输入框当前的值
    async fn value(&self, element: &Self::Element) -> Result<String>;

    /// 字段的标签文字（label、placeholder 或 aria-label）
    async fn label(&self, element: &Self::Element) -> Result<String>;

    /// 选中文字包含 `containing`（不区分大小写）的第一个选项；没有则返回 false
    async fn select_option(&self, element: &Self::Element, containing: &str) -> Result<bool>;

    async fn upload_file(&self, element: &Self::Element, path: &Path) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// 释放会话
    async fn close(self) -> Result<()>;
}

/// 会话启动器
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Driver: UiDriver;

    async fn launch(&self) -> Result<Self::Driver>;
}

/// 在一组选择器中找到第一个可见且可用的元素
///
/// 每个选择器单独等待 `timeout`。命中但不可见或不可用的跳过；驱动出错直接返回 `Err`。
pub async fn find_actionable<D: UiDriver>(
    driver: &D,
    set: &SelectorSet,
    timeout: Duration,
) -> Result<Option<D::Element>> {
    for selector in set.selectors {
        let Some(element) = driver.find(std::slice::from_ref(selector), timeout).await? else {
            continue;
        };
        if driver.is_visible(&element).await? && driver.is_enabled(&element).await? {
            return Ok(Some(element));
        }
        tracing::debug!("{} 命中但不可见或不可用", selector);
    }
    Ok(None)
}
