//! 浏览器会话
//!
//! 配置了调试端口时连接到已运行的浏览器，否则自行启动一个。

pub mod connection;
pub mod launch;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::BrowserSettings;
use crate::infrastructure::chromium_driver::{BrowserOwnership, ChromiumDriver};
use crate::infrastructure::driver::SessionLauncher;

pub use connection::connect_to_browser;
pub use launch::launch_browser;

/// 基于 Chromium 的会话启动器
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self) -> Result<ChromiumDriver> {
        let driver = match self.settings.debug_port {
            Some(port) => {
                let (browser, page, handler) = connect_to_browser(port).await?;
                ChromiumDriver::new(browser, page, handler, BrowserOwnership::Attached)
            }
            None => {
                let (browser, page, handler) = launch_browser(&self.settings).await?;
                ChromiumDriver::new(browser, page, handler, BrowserOwnership::Launched)
            }
        };
        info!("🌐 浏览器会话就绪 ({:?})", driver.ownership());
        Ok(driver)
    }
}
