//! 人工操作节奏
//!
//! 所有与“像人一样慢一点”有关的随机等待都集中在这里，
//! 测试里用 [`HumanPacing::instant`] 把它们全部归零。

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tokio::time::sleep;

/// 随机延迟区间（毫秒，闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn millis(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn seconds(min: u64, max: u64) -> Self {
        Self::millis(min.saturating_mul(1000), max.saturating_mul(1000))
    }

    pub const fn zero() -> Self {
        Self::millis(0, 0)
    }

    /// 在区间内随机取一个时长；区间写反时取下限
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    /// 随机等待一次
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// 单次击键间隔
pub type KeystrokePace = DelayRange;

/// 一组人工操作节奏
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HumanPacing {
    /// 击键间隔
    pub keystroke: KeystrokePace,
    /// 点击/填写之间的停顿
    pub action: DelayRange,
    /// 表单步骤之间的停顿
    pub step: DelayRange,
    /// 页面加载后的等待
    pub page_load: DelayRange,
}

impl Default for HumanPacing {
    fn default() -> Self {
        Self {
            keystroke: DelayRange::millis(50, 150),
            action: DelayRange::millis(500, 1500),
            step: DelayRange::seconds(2, 4),
            page_load: DelayRange::seconds(3, 5),
        }
    }
}

impl HumanPacing {
    /// 不做任何等待
    pub const fn instant() -> Self {
        Self {
            keystroke: DelayRange::zero(),
            action: DelayRange::zero(),
            step: DelayRange::zero(),
            page_load: DelayRange::zero(),
        }
    }
}
