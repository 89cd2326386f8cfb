//! 登录流程
//!
//! 失败会终止整次运行，所以这里返回具体的 [`AuthError`]。

use std::time::Duration;

use tracing::{info, warn};

use crate::config::{Config, Credentials};
use crate::error::AuthError;
use crate::infrastructure::driver::UiDriver;
use crate::infrastructure::selectors::{
    SelectorSet, LOGIN_PASSWORD, LOGIN_SUBMIT, LOGIN_SUCCESS, LOGIN_USERNAME,
};
use crate::utils::pacing::HumanPacing;

/// 登录后仍停留在这些页面说明没有登录成功
const BLOCKED_URL_MARKERS: [&str; 3] = ["login", "challenge", "checkpoint"];

pub struct LoginFlow {
    login_url: String,
    credentials: Credentials,
    pacing: HumanPacing,
    lookup_timeout: Duration,
}

impl LoginFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            credentials: config.credentials.clone(),
            pacing: config.pacing,
            lookup_timeout: Duration::from_millis(config.apply_lookup_timeout_ms),
        }
    }

    /// 登录平台
    pub async fn authenticate<D: UiDriver>(&self, driver: &D) -> Result<(), AuthError> {
        info!("🔐 正在登录 {}", self.login_url);

        driver.navigate(&self.login_url).await.map_err(driver_error)?;
        self.pacing.page_load.wait().await;

        let username = self.require(driver, &LOGIN_USERNAME).await?;
        driver
            .type_text(&username, &self.credentials.email, &self.pacing.keystroke)
            .await
            .map_err(driver_error)?;
        self.pacing.action.wait().await;

        let password = self.require(driver, &LOGIN_PASSWORD).await?;
        driver
            .type_text(&password, &self.credentials.password, &self.pacing.keystroke)
            .await
            .map_err(driver_error)?;
        self.pacing.action.wait().await;

        let submit = self.require(driver, &LOGIN_SUBMIT).await?;
        driver.click(&submit).await.map_err(driver_error)?;
        self.pacing.page_load.wait().await;

        self.verify(driver).await
    }

    async fn require<D: UiDriver>(&self, driver: &D, set: &SelectorSet) -> Result<D::Element, AuthError> {
        driver
            .find(set.selectors, self.lookup_timeout)
            .await
            .map_err(driver_error)?
            .ok_or(AuthError::FieldNotFound(set.name))
    }

    /// 有导航栏即成功；没有导航栏时看是否还停在登录/验证页
    async fn verify<D: UiDriver>(&self, driver: &D) -> Result<(), AuthError> {
        let marker = driver
            .find(LOGIN_SUCCESS.selectors, self.lookup_timeout)
            .await
            .map_err(driver_error)?;
        if marker.is_some() {
            info!("✅ 登录成功");
            return Ok(());
        }

        let url = driver.current_url().await.map_err(driver_error)?;
        let lowered = url.to_lowercase();
        if BLOCKED_URL_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Err(AuthError::VerificationFailed { url });
        }

        warn!("⚠️ 未找到登录成功标识，但已离开登录页: {}", url);
        Ok(())
    }
}

fn driver_error(e: anyhow::Error) -> AuthError {
    AuthError::Driver(format!("{:#}", e))
}
