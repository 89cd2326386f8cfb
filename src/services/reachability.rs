//! 平台连通性检查

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// 连通性探测能力
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// 通过 HTTP 请求探测
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("无法创建连通性检查 HTTP 客户端")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        // 只要服务器有响应就算可达，状态码不重要（登录墙常返回 999/403）
        match self.client.get(url).send().await {
            Ok(resp) => {
                debug!("连通性检查 {} -> {}", url, resp.status());
                true
            }
            Err(e) => {
                warn!("⚠️ 连通性检查失败 {}: {}", url, e);
                false
            }
        }
    }
}
